//! rconsole backend API client.
//!
//! - [`transport`]: the [`Transport`] seam and its `reqwest` implementation
//! - [`session`]: the [`SessionLayer`] every request passes through, which
//!   renews an expired session once and replays the request
//! - [`refresh`]: the single-flight [`RefreshCoordinator`] behind it
//! - endpoint helpers on [`ConsoleClient`] for auth, commands, servers and
//!   activity logs
//!
//! # Example
//!
//! ```ignore
//! use rconsole_api::ConsoleClient;
//!
//! let client = ConsoleClient::new("http://localhost:8000", std::time::Duration::from_secs(30))?;
//! client.login("ana@example.com", "secret").await?;
//! let user = client.current_user().await?;
//! ```

pub mod auth;
pub mod client;
pub mod commands;
mod error;
pub mod refresh;
pub mod servers;
pub mod session;
pub mod transport;

pub use client::ConsoleClient;
pub use commands::build_command_body;
pub use error::ApiError;
pub use refresh::{AuthEvent, RefreshCoordinator, RefreshOutcome};
pub use session::{AuthEndpointRefresher, SessionLayer, SessionRefresher, ensure_success};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport, validate_base_url};
