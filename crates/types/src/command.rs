//! Command catalog records.
//!
//! A [`CommandDefinition`] is the immutable description of one remote
//! administrative operation: what the user sees (name, description, ordered
//! parameters), how the input is checked (optional [`ValidationSchema`]) and
//! how the call is made ([`RemoteInvocation`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::ValidationSchema;

/// A complete console command: display data, parameters and remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Stable identifier, unique across the catalog (e.g. `vl_activate`)
    pub id: String,
    /// Localized display name
    pub name: String,
    /// Localized description shown next to the selector
    pub description: String,
    /// Ordered parameters; the order is the positional order of the remote call
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
    /// Declarative per-field constraints; `None` means always valid
    #[serde(default)]
    pub schema: Option<ValidationSchema>,
    /// The HTTP call bound to this command
    pub invocation: RemoteInvocation,
}

impl CommandDefinition {
    /// Looks up a parameter by identifier.
    pub fn param(&self, id: &str) -> Option<&ParameterSpec> {
        self.params.iter().find(|param| param.id == id)
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// Parameters the user must fill before the command can run.
    pub fn required_params(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.params.iter().filter(|param| !param.optional)
    }
}

/// Describes a single input of a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Identifier unique within the owning command (e.g. `licenseKey`)
    pub id: String,
    /// Localized label
    pub name: String,
    /// Value kind, which also decides the rendered control
    pub kind: ParamKind,
    /// Optional parameters never block execution when empty
    #[serde(default)]
    pub optional: bool,
    /// Placeholder hint rendered in empty fields
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl ParameterSpec {
    /// Choices for enumeration parameters; empty for every other kind.
    pub fn choices(&self) -> &[SelectOption] {
        match &self.kind {
            ParamKind::Enumeration(options) => options,
            _ => &[],
        }
    }
}

/// Value kinds a parameter may hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum ParamKind {
    Text,
    /// Text rendered masked (passwords)
    Secret,
    Number,
    Boolean,
    Enumeration(Vec<SelectOption>),
}

impl ParamKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Secret => "secret",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enumeration(_) => "enumeration",
        }
    }
}

/// An enumeration choice: `id` is submitted, `value` is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// HTTP verbs used by the command endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvocationMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl InvocationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// GET requests carry no body.
    pub fn sends_body(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for InvocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed HTTP call behind a command.
///
/// `bindings` lines up with the command's parameters: the n-th positional
/// argument is sent under the n-th binding's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInvocation {
    pub method: InvocationMethod,
    /// API-relative path (e.g. `/commands/vl_activate/`)
    pub path: String,
    #[serde(default)]
    pub bindings: Vec<BodyBinding>,
}

/// JSON body key and encoding for one positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyBinding {
    pub key: String,
    #[serde(default)]
    pub encoding: BodyEncoding,
}

impl BodyBinding {
    pub fn scalar(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            encoding: BodyEncoding::Scalar,
        }
    }

    pub fn comma_list(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            encoding: BodyEncoding::CommaList,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// Sent as-is
    #[default]
    Scalar,
    /// Text split on commas into a JSON array of trimmed, non-empty items
    CommaList,
}
