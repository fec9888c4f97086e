//! Declarative per-field constraints interpreted by the engine's validator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Expected type of a constrained field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Text,
    Number,
    Boolean,
}

/// Constraints for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub value_type: ValueType,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub integer: bool,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed_values: Vec<String>,
}

fn default_required() -> bool {
    true
}

impl FieldConstraint {
    /// A required text field with no further rules.
    pub fn text() -> Self {
        Self::of(ValueType::Text)
    }

    /// A required numeric field with no further rules.
    pub fn number() -> Self {
        Self::of(ValueType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(ValueType::Boolean)
    }

    fn of(value_type: ValueType) -> Self {
        Self {
            value_type,
            required: true,
            min_length: None,
            max_length: None,
            min: None,
            max: None,
            integer: false,
            pattern: None,
            allowed_values: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Field constraints keyed by parameter id. An empty schema accepts anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSchema {
    pub fields: IndexMap<String, FieldConstraint>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, id: impl Into<String>, constraint: FieldConstraint) -> Self {
        self.fields.insert(id.into(), constraint);
        self
    }

    pub fn get(&self, id: &str) -> Option<&FieldConstraint> {
        self.fields.get(id)
    }
}
