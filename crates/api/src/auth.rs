//! Session endpoints.

use rconsole_types::{AuthStatus, User, UserRecord};
use serde_json::json;
use tracing::debug;

use crate::client::ConsoleClient;
use crate::session::{AUTH_PATH, ensure_success};
use crate::transport::ApiRequest;
use crate::ApiError;

impl ConsoleClient {
    /// `POST /auth`. The session cookie lands in the transport's cookie store.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        debug!(email, "signing in");
        let request = ApiRequest::post(AUTH_PATH)
            .json(json!({ "correo": email, "contrasena": password }))
            .without_refresh();
        let response = self.session().send(&request).await?;
        ensure_success(response).map(|_| ())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = ApiRequest::delete(AUTH_PATH).without_refresh();
        let response = self.session().send(&request).await?;
        ensure_success(response).map(|_| ())
    }

    /// `PUT /auth` outside the coordinator; the session layer refreshes on its own.
    pub async fn refresh_session(&self) -> Result<AuthStatus, ApiError> {
        let request = ApiRequest::put(AUTH_PATH).without_refresh();
        self.session().send_json(&request).await
    }

    pub async fn check_auth(&self) -> Result<AuthStatus, ApiError> {
        self.session().send_json(&ApiRequest::get("/auth/check")).await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        let record: UserRecord = self.session().send_json(&ApiRequest::get("/users")).await?;
        Ok(User::from(record))
    }
}
