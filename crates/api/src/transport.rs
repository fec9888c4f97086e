//! The HTTP transport seam.
//!
//! [`Transport`] sends one request and returns the raw status and body. The
//! session layer sits on top of it and never talks to `reqwest` directly, so
//! tests can swap in a scripted transport.

use std::time::Duration;

use async_trait::async_trait;
use rconsole_types::InvocationMethod;
use reqwest::{Client, Method, header};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::ApiError;

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: InvocationMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// When false a 401 is returned as-is instead of triggering a session refresh
    pub refresh_on_unauthorized: bool,
}

impl ApiRequest {
    pub fn new(method: InvocationMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            refresh_on_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(InvocationMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(InvocationMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(InvocationMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(InvocationMethod::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_unauthorized = false;
        self
    }
}

/// Status code and body text of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Production transport backed by a cookie-enabled `reqwest::Client`.
///
/// The backend keeps the session in cookies set by `POST /auth`, so one
/// transport instance must be shared by every request of a session.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("rconsole/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, %url, "http request started");

        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), &url)
            .header(header::USER_AGENT, &self.user_agent);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(method = %request.method, %url, status, "http request completed");
        Ok(ApiResponse { status, body })
    }
}

fn to_reqwest_method(method: InvocationMethod) -> Method {
    match method {
        InvocationMethod::Get => Method::GET,
        InvocationMethod::Post => Method::POST,
        InvocationMethod::Put => Method::PUT,
        InvocationMethod::Delete => Method::DELETE,
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
pub fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let parsed = Url::parse(base).map_err(|e| ApiError::InvalidBaseUrl(format!("'{base}': {e}")))?;

    let host_name = parsed
        .host_str()
        .ok_or_else(|| ApiError::InvalidBaseUrl(format!("'{base}' must include a host")))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(ApiError::InvalidBaseUrl(format!(
            "'{base}' must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        )));
    }
    Ok(())
}
