//! Backend command responses and the user-facing execution result.

use serde::{Deserialize, Serialize};

/// Payload returned by the command endpoints.
///
/// Some endpoints answer with a bare `{ "success": true }`; every other field
/// is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CommandResponse {
    /// Decode the raw response text.
    ///
    /// A payload that is itself a JSON string holding the object (double
    /// encoded) is unwrapped once.
    pub fn from_raw(raw: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str::<serde_json::Value>(raw)? {
            serde_json::Value::String(inner) => serde_json::from_str(&inner),
            value => serde_json::from_value(value),
        }
    }
}

/// Outcome of one execution attempt, shown in exactly one result modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success { command_label: String, response: String },
    Failure { message: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
