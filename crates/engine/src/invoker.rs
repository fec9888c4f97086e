use anyhow::Result;
use async_trait::async_trait;
use rconsole_api::{ConsoleClient, build_command_body};
use rconsole_types::{CommandDefinition, ParamValue};
use serde_json::{Value, json};
use tracing::debug;

/// Execute a single remote command.
///
/// Implementations return the raw response text; decoding it into a
/// [`rconsole_types::CommandResponse`] is the controller's job.
#[async_trait]
pub trait CommandInvoker: Send + Sync {
    async fn invoke(&self, command: &CommandDefinition, args: &[Option<ParamValue>]) -> Result<String>;
}

/// Calls the backend command endpoint through the session layer.
#[derive(Clone)]
pub struct HttpCommandInvoker {
    client: ConsoleClient,
}

impl HttpCommandInvoker {
    pub fn new(client: ConsoleClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandInvoker for HttpCommandInvoker {
    async fn invoke(&self, command: &CommandDefinition, args: &[Option<ParamValue>]) -> Result<String> {
        debug!(
            command = %command.id,
            method = %command.invocation.method,
            args = args.iter().flatten().count(),
            "http invoker executing command"
        );
        Ok(self.client.invoke_command(&command.invocation, args).await?)
    }
}

/// Echoes the request body back as a successful command payload. Used for
/// dry runs and tests.
pub struct NoopInvoker;

#[async_trait]
impl CommandInvoker for NoopInvoker {
    async fn invoke(&self, command: &CommandDefinition, args: &[Option<ParamValue>]) -> Result<String> {
        let body = build_command_body(&command.invocation, args).unwrap_or(Value::Null);
        let payload = json!({
            "success": true,
            "command": command.name,
            "response": format!("{} {} {}", command.invocation.method, command.invocation.path, body),
        });
        Ok(payload.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rconsole_registry::CommandCatalog;
    use rconsole_types::{CommandResponse, Locale};

    use super::*;

    #[tokio::test]
    async fn noop_invoker_echoes_the_body() {
        let command = CommandCatalog::new(Locale::En).get("vl_enable").unwrap();
        let raw = NoopInvoker.invoke(&command, &[Some("K-1".into())]).await.unwrap();
        let response = CommandResponse::from_raw(&raw).unwrap();
        assert!(response.success);
        assert_eq!(response.command.as_deref(), Some(command.name.as_str()));
        assert!(response.response.unwrap().contains(r#"{"licensekey":"K-1"}"#));
    }
}
