//! The HTTP session layer.
//!
//! Every outbound call goes through [`SessionLayer::send`]. A 401 triggers one
//! coordinated session refresh (see [`RefreshCoordinator`]) and a single
//! replay of the original request; a second 401 is returned as
//! [`ApiError::Unauthorized`].

use std::sync::Arc;

use async_trait::async_trait;
use rconsole_types::AuthStatus;
use rconsole_util::http::{status_error_message, truncate_response_preview};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::refresh::{AuthEvent, RefreshCoordinator};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::ApiError;

/// Path of the session endpoint (`PUT` renews the session cookie).
pub const AUTH_PATH: &str = "/auth";

/// Performs the refresh exchange.
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    async fn refresh(&self) -> Result<(), ApiError>;
}

/// Refresher that calls `PUT /auth` and expects `{ "authenticated": true }`.
pub struct AuthEndpointRefresher {
    transport: Arc<dyn Transport>,
}

impl AuthEndpointRefresher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl SessionRefresher for AuthEndpointRefresher {
    async fn refresh(&self) -> Result<(), ApiError> {
        let request = ApiRequest::put(AUTH_PATH).without_refresh();
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(ApiError::RefreshFailed(format!("refresh endpoint returned {}", response.status)));
        }
        let status: AuthStatus = serde_json::from_str(&response.body)
            .map_err(|error| ApiError::RefreshFailed(format!("unreadable refresh response: {error}")))?;
        if status.authenticated {
            Ok(())
        } else {
            Err(ApiError::RefreshFailed("session not renewed".into()))
        }
    }
}

pub struct SessionLayer {
    transport: Arc<dyn Transport>,
    refresher: Arc<dyn SessionRefresher>,
    coordinator: RefreshCoordinator,
}

impl SessionLayer {
    /// Session layer refreshing through `PUT /auth` on the same transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let refresher = Arc::new(AuthEndpointRefresher::new(Arc::clone(&transport)));
        Self::with_refresher(transport, refresher)
    }

    pub fn with_refresher(transport: Arc<dyn Transport>, refresher: Arc<dyn SessionRefresher>) -> Self {
        Self {
            transport,
            refresher,
            coordinator: RefreshCoordinator::new(),
        }
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Receive [`AuthEvent`]s, e.g. to end the session when a refresh fails.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.coordinator.subscribe()
    }

    /// Send a request, refreshing the session and replaying once on a 401.
    ///
    /// Non-401 statuses are returned unchanged; use [`SessionLayer::send_json`]
    /// or [`SessionLayer::send_text`] to turn them into errors.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let observed_generation = self.coordinator.generation();
        let response = self.transport.send(request).await?;
        if !response.is_unauthorized() || !request.refresh_on_unauthorized {
            return Ok(response);
        }

        debug!(method = %request.method, path = %request.path, "401 received; refreshing session");
        self.coordinator
            .run_exclusive(observed_generation, || self.refresher.refresh())
            .await?;

        let replayed = self.transport.send(request).await?;
        if replayed.is_unauthorized() {
            debug!(method = %request.method, path = %request.path, "401 after refresh; giving up");
            return Err(ApiError::Unauthorized);
        }
        Ok(replayed)
    }

    /// Send and return the body text of a 2xx response.
    pub async fn send_text(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let response = self.send(request).await?;
        ensure_success(response).map(|response| response.body)
    }

    /// Send and decode the JSON body of a 2xx response.
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let body = self.send_text(request).await?;
        serde_json::from_str(&body).map_err(|error| {
            ApiError::Decode(format!("{error}; body: {}", truncate_response_preview(&body, 200)))
        })
    }
}

/// Map non-2xx responses to [`ApiError`], preferring the backend's own message.
pub fn ensure_success(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    if response.is_unauthorized() {
        return Err(ApiError::Unauthorized);
    }
    let message = backend_message(&response.body)
        .or_else(|| status_error_message(response.status))
        .unwrap_or_else(|| format!("HTTP {}: {}", response.status, truncate_response_preview(&response.body, 200)));
    Err(ApiError::Status {
        status: response.status,
        message,
    })
}

fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}
