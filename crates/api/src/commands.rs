//! Remote command invocation.

use rconsole_types::{BodyEncoding, CommandResponse, ParamValue, RemoteInvocation};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::ConsoleClient;
use crate::session::ensure_success;
use crate::transport::ApiRequest;
use crate::ApiError;

/// Build the JSON body for a command call from its positional arguments.
///
/// Returns `None` for GET and for commands without bindings. Absent
/// arguments are left out of the body.
pub fn build_command_body(invocation: &RemoteInvocation, args: &[Option<ParamValue>]) -> Option<Value> {
    if !invocation.method.sends_body() || invocation.bindings.is_empty() {
        return None;
    }
    if args.len() > invocation.bindings.len() {
        warn!(
            path = %invocation.path,
            args = args.len(),
            bindings = invocation.bindings.len(),
            "extra positional arguments ignored"
        );
    }

    let mut body = Map::new();
    for (binding, arg) in invocation.bindings.iter().zip(args) {
        let Some(value) = arg else { continue };
        let encoded = match (binding.encoding, value) {
            (BodyEncoding::CommaList, ParamValue::Text(text)) => Value::Array(
                text.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            ),
            _ => value.to_json(),
        };
        body.insert(binding.key.clone(), encoded);
    }
    Some(Value::Object(body))
}

impl ConsoleClient {
    /// Call a command endpoint and return the raw response text.
    ///
    /// Error statuses whose body is still a command payload (`{ success:
    /// false, error }`) are returned as text so the caller can show the
    /// backend's message.
    pub async fn invoke_command(
        &self,
        invocation: &RemoteInvocation,
        args: &[Option<ParamValue>],
    ) -> Result<String, ApiError> {
        let mut request = ApiRequest::new(invocation.method, invocation.path.clone());
        if let Some(body) = build_command_body(invocation, args) {
            request = request.json(body);
        }
        debug!(method = %invocation.method, path = %invocation.path, "invoking command");

        let response = self.session().send(&request).await?;
        if !response.is_success() && !response.is_unauthorized() && CommandResponse::from_raw(&response.body).is_ok() {
            debug!(status = response.status, "command endpoint returned an error payload");
            return Ok(response.body);
        }
        ensure_success(response).map(|response| response.body)
    }
}
