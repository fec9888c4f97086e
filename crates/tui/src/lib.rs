//! # rconsole TUI
//!
//! Terminal front end for the command console: pick a subset and a command,
//! fill in its parameters, confirm, and read the result. The execution state
//! machine lives in `rconsole-engine`; this crate only draws it and routes
//! keys to it.

mod app;
mod cmd;
mod runtime;
mod theme;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use rconsole_api::AuthEvent;
use rconsole_engine::{CommandInvoker, ExecutionController};
use rconsole_registry::{CommandCatalog, SubsetStore};
use rconsole_types::Locale;
use tokio::sync::broadcast;

pub struct TuiOptions {
    pub locale: Locale,
    pub invoker: Arc<dyn CommandInvoker>,
    pub store: Arc<dyn SubsetStore>,
    /// Owner of the custom subsets shown alongside the predefined ones.
    pub user_id: String,
    pub user_label: String,
    /// A failed session refresh ends the TUI with an error.
    pub auth_events: broadcast::Receiver<AuthEvent>,
}

/// Run the TUI until the user quits or the session expires.
pub async fn run(options: TuiOptions) -> Result<()> {
    let controller = ExecutionController::new(CommandCatalog::new(options.locale));
    let app = app::App::new(controller, options.store, options.user_id, options.user_label);
    runtime::run_app(app, options.invoker, options.auth_events).await
}
