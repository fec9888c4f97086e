use std::sync::Arc;
use std::time::Duration;

use rconsole_util::ConsoleConfig;
use tokio::sync::broadcast;

use crate::refresh::AuthEvent;
use crate::session::SessionLayer;
use crate::transport::{ReqwestTransport, Transport};
use crate::ApiError;

/// Handle to the backend API. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct ConsoleClient {
    session: Arc<SessionLayer>,
}

impl ConsoleClient {
    /// Build a client over a cookie-enabled `reqwest` transport.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(base_url, timeout)?);
        Ok(Self::from_session(SessionLayer::new(transport)))
    }

    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base, config.request_timeout())
    }

    pub fn from_session(session: SessionLayer) -> Self {
        Self {
            session: Arc::new(session),
        }
    }

    pub fn session(&self) -> &SessionLayer {
        &self.session
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.session.subscribe()
    }
}
