//! Background execution of confirmed commands.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use rconsole_engine::{CommandInvoker, ExecutionTicket};
use tracing::{debug, error};

use crate::app::Msg;

/// Run `ticket` on the Tokio runtime. The returned future resolves to the
/// completion message, even when the task panics.
pub fn spawn_execution(invoker: Arc<dyn CommandInvoker>, ticket: ExecutionTicket) -> BoxFuture<'static, Msg> {
    let attempt = ticket.attempt;
    debug!(command = %ticket.command.id, attempt, "spawning command execution");
    let handle = tokio::spawn(async move {
        let outcome = invoker.invoke(&ticket.command, &ticket.args).await;
        Msg::ExecCompleted { attempt, outcome }
    });
    handle
        .map(move |joined| {
            joined.unwrap_or_else(|join_error| {
                error!(attempt, error = %join_error, "execution task failed");
                Msg::ExecCompleted {
                    attempt,
                    outcome: Err(anyhow::anyhow!("execution task failed: {join_error}")),
                }
            })
        })
        .boxed()
}
