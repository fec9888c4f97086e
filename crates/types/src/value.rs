//! Typed parameter values entered in the execution form.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::command::CommandDefinition;

/// A single entered value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Empty text counts as "not provided"; `0` and `false` do not.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// JSON encoding used for request bodies. Whole numbers are sent as
    /// integers so `users: 10` does not become `10.0`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(number) => {
                if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
                    Value::Number(Number::from(*number as i64))
                } else {
                    Number::from_f64(*number).map(Value::Number).unwrap_or(Value::Null)
                }
            }
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Text(text) => f.write_str(text),
            Self::Number(number) if number.fract() == 0.0 => write!(f, "{}", *number as i64),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("command '{command}' has no parameter '{param}'")]
    UnknownParameter { command: String, param: String },
}

/// Values entered for the active command, keyed by parameter id.
///
/// Writes go through [`ParamValueMap::set`], which refuses ids the active
/// command does not declare.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParamValueMap {
    values: IndexMap<String, ParamValue>,
}

impl ParamValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value for a parameter declared by `command`.
    pub fn set(&mut self, command: &CommandDefinition, param_id: &str, value: ParamValue) -> Result<(), ParamError> {
        if command.param(param_id).is_none() {
            return Err(ParamError::UnknownParameter {
                command: command.id.clone(),
                param: param_id.to_string(),
            });
        }
        self.values.insert(param_id.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, param_id: &str) -> Option<ParamValue> {
        self.values.shift_remove(param_id)
    }

    pub fn get(&self, param_id: &str) -> Option<&ParamValue> {
        self.values.get(param_id)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// True when the entry exists and is not empty text.
    pub fn has_value(&self, param_id: &str) -> bool {
        self.values.get(param_id).is_some_and(|value| !value.is_empty())
    }

    /// Values in the command's declared parameter order, `None` for blanks.
    pub fn positional_args(&self, command: &CommandDefinition) -> Vec<Option<ParamValue>> {
        command
            .params
            .iter()
            .map(|param| self.values.get(&param.id).filter(|value| !value.is_empty()).cloned())
            .collect()
    }
}
