//! Parameter form model.
//!
//! [`build_form`] turns a command's parameter list and the current values into
//! renderer-agnostic controls; the TUI and CLI both draw from this model.

use indexmap::IndexMap;
use rconsole_types::{CommandDefinition, ParamKind, ParamValue, ParamValueMap, ParameterSpec, SelectOption};

/// An edit applied to one parameter through the execution controller.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    /// Free text. Number parameters parse it; empty text clears the entry.
    Text(String),
    /// Pick an option of an enumeration by index.
    Select(usize),
    SetBool(bool),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Select {
        options: Vec<SelectOption>,
        selected: Option<usize>,
    },
    /// Exclusive yes/no pair; unset until the user picks one.
    YesNo { value: Option<bool> },
    Number { text: String },
    Text { text: String, masked: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormControl {
    pub param_id: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub required: bool,
    pub kind: ControlKind,
    pub error: Option<String>,
}

impl FormControl {
    /// Text shown for the current value; secrets are masked.
    pub fn display_value(&self) -> String {
        match &self.kind {
            ControlKind::Select { options, selected } => selected
                .and_then(|index| options.get(index))
                .map(|option| option.value.clone())
                .unwrap_or_default(),
            ControlKind::YesNo { value } => match value {
                Some(true) => "yes".into(),
                Some(false) => "no".into(),
                None => String::new(),
            },
            ControlKind::Number { text } => text.clone(),
            ControlKind::Text { text, masked: true } => "•".repeat(text.chars().count()),
            ControlKind::Text { text, masked: false } => text.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ControlKind::Select { selected, .. } => selected.is_none(),
            ControlKind::YesNo { value } => value.is_none(),
            ControlKind::Number { text } | ControlKind::Text { text, .. } => text.is_empty(),
        }
    }
}

/// One control per parameter, in declared order. No command yields no controls.
pub fn build_form(
    command: Option<&CommandDefinition>,
    values: &ParamValueMap,
    errors: &IndexMap<String, String>,
) -> Vec<FormControl> {
    let Some(command) = command else {
        return Vec::new();
    };
    command
        .params
        .iter()
        .map(|param| FormControl {
            param_id: param.id.clone(),
            label: param.name.clone(),
            placeholder: param.placeholder.clone(),
            required: !param.optional,
            kind: control_kind(param, values.get(&param.id)),
            error: errors.get(&param.id).cloned(),
        })
        .collect()
}

fn control_kind(param: &ParameterSpec, value: Option<&ParamValue>) -> ControlKind {
    let text = || value.map(ToString::to_string).unwrap_or_default();
    match &param.kind {
        ParamKind::Enumeration(options) => ControlKind::Select {
            selected: value
                .and_then(ParamValue::as_text)
                .and_then(|current| options.iter().position(|option| option.id == current)),
            options: options.clone(),
        },
        ParamKind::Boolean => ControlKind::YesNo {
            value: value.and_then(ParamValue::as_bool),
        },
        ParamKind::Number => ControlKind::Number { text: text() },
        ParamKind::Text => ControlKind::Text {
            text: text(),
            masked: false,
        },
        ParamKind::Secret => ControlKind::Text {
            text: text(),
            masked: true,
        },
    }
}
