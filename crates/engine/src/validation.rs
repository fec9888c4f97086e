//! Validation for command parameters.
//!
//! Two independent checks run before a command reaches the network:
//! per-field schema constraints (re-run on every edit) and a Windows path
//! heuristic applied once, at confirmation time.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rconsole_types::{CommandDefinition, FieldConstraint, Locale, ParamValue, ParamValueMap, ValidationSchema, ValueType};
use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::messages::Message;

/// Drive-rooted (`C:\`), UNC (`\\server\share`) or backslash-relative
/// (`.\dir\`, `..\dir\`, `dir\`) paths.
pub static WINDOWS_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-zA-Z]:\\|\\\\[^\\/:*?<>|]+\\[^\\/:*?<>|]+|(?:\.{1,2}\\)?[^/:*?<>|]+\\)+[^/:*?<>|]*$")
        .expect("windows path regex should compile")
});

/// Outcome of schema validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Localized message per failing field, in schema order.
    pub errors: IndexMap<String, String>,
    /// Present only when every field passed.
    pub parsed: Option<ParsedValues>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Typed, validated parameter values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedValues {
    values: IndexMap<String, ParamValue>,
}

impl ParsedValues {
    pub fn get(&self, field: &str) -> Option<&ParamValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(ParamValue::as_text)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(ParamValue::as_number)
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(ParamValue::as_bool)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<&ParamValueMap> for ParsedValues {
    fn from(values: &ParamValueMap) -> Self {
        Self {
            values: values
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        }
    }
}

/// Validate `values` against `schema`. A missing schema accepts anything.
pub fn validate_values(schema: Option<&ValidationSchema>, values: &ParamValueMap, locale: Locale) -> ValidationReport {
    let mut errors = IndexMap::new();
    if let Some(schema) = schema {
        for (field, constraint) in &schema.fields {
            if let Err(message) = check_field(constraint, values.get(field)) {
                errors.insert(field.clone(), message.render(locale));
            }
        }
    }
    let parsed = errors.is_empty().then(|| ParsedValues::from(values));
    ValidationReport { errors, parsed }
}

/// Check a single value. Empty text counts as absent.
pub fn check_field(constraint: &FieldConstraint, value: Option<&ParamValue>) -> Result<(), Message> {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return if constraint.required { Err(Message::Required) } else { Ok(()) };
    };

    match constraint.value_type {
        ValueType::Text => {
            let text = value.as_text().ok_or(Message::ExpectedText)?;
            let length = text.chars().count();
            if let Some(min) = constraint.min_length
                && length < min
            {
                return Err(Message::TooShort(min));
            }
            if let Some(max) = constraint.max_length
                && length > max
            {
                return Err(Message::TooLong(max));
            }
            if let Some(pattern) = &constraint.pattern {
                match Regex::new(pattern) {
                    Ok(regex) if regex.is_match(text) => {}
                    Ok(_) => return Err(Message::PatternMismatch),
                    Err(error) => {
                        warn!(%pattern, %error, "invalid constraint pattern");
                        return Err(Message::PatternMismatch);
                    }
                }
            }
            check_allowed(constraint, text)
        }
        ValueType::Number => {
            let number = value.as_number().ok_or(Message::ExpectedNumber)?;
            if constraint.integer && number.fract() != 0.0 {
                return Err(Message::NotInteger);
            }
            if let Some(min) = constraint.min
                && number < min
            {
                return Err(Message::BelowMinimum(min));
            }
            if let Some(max) = constraint.max
                && number > max
            {
                return Err(Message::AboveMaximum(max));
            }
            check_allowed(constraint, &value.to_string())
        }
        ValueType::Boolean => value.as_bool().map(|_| ()).ok_or(Message::ExpectedBoolean),
    }
}

fn check_allowed(constraint: &FieldConstraint, candidate: &str) -> Result<(), Message> {
    if constraint.allowed_values.is_empty() || constraint.allowed_values.iter().any(|allowed| allowed == candidate) {
        Ok(())
    } else {
        Err(Message::NotAllowed(constraint.allowed_values.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter '{param}' is not a valid path: {value}")]
pub struct PathRejection {
    pub param: String,
    pub value: String,
}

pub fn is_windows_path(candidate: &str) -> bool {
    WINDOWS_PATH.is_match(candidate)
}

/// First entry whose id mentions `path`, ignoring case.
pub fn find_path_parameter(values: &ParamValueMap) -> Option<(&str, &ParamValue)> {
    values.iter().find(|(id, _)| id.to_ascii_lowercase().contains("path"))
}

/// Reject a non-empty path-like text value that is not a Windows path.
pub fn check_path_heuristic(values: &ParamValueMap) -> Result<(), PathRejection> {
    let Some((param, value)) = find_path_parameter(values) else {
        return Ok(());
    };
    match value.as_text() {
        Some(text) if !text.is_empty() && !is_windows_path(text) => Err(PathRejection {
            param: param.to_string(),
            value: text.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Whether the execute trigger may be enabled.
pub fn execution_allowed(
    command: Option<&CommandDefinition>,
    values: &ParamValueMap,
    schema_valid: bool,
    executing: bool,
) -> bool {
    let Some(command) = command else {
        return false;
    };
    if executing {
        return false;
    }
    !command.has_params() || (schema_valid && command.required_params().all(|param| values.has_value(&param.id)))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use proptest::sample::Index;
    use rconsole_registry::CommandCatalog;

    use super::*;

    fn values(command: &CommandDefinition, pairs: &[(&str, ParamValue)]) -> ParamValueMap {
        let mut map = ParamValueMap::new();
        for (id, value) in pairs {
            map.set(command, id, value.clone()).unwrap();
        }
        map
    }

    fn volume_install() -> std::sync::Arc<CommandDefinition> {
        CommandCatalog::new(Locale::En).get("vl_activate").unwrap()
    }

    #[test]
    fn volume_install_values_within_bounds_pass() {
        let command = volume_install();
        let map = values(
            &command,
            &[
                ("licenseKey", "ABCDE-12345".into()),
                ("users", 10_i64.into()),
                ("edition", "Enterprise".into()),
                ("supportYears", 2_i64.into()),
            ],
        );
        let report = validate_values(command.schema.as_ref(), &map, Locale::En);
        assert!(report.is_valid(), "{:?}", report.errors);
        let parsed = report.parsed.unwrap();
        assert_eq!(parsed.number("users"), Some(10.0));
        assert_eq!(parsed.text("edition"), Some("Enterprise"));
    }

    #[test]
    fn out_of_range_and_fractional_numbers_are_reported() {
        let command = volume_install();
        let map = values(
            &command,
            &[
                ("licenseKey", "K".into()),
                ("users", 101_i64.into()),
                ("edition", "Enterprise".into()),
                ("supportYears", 1.5_f64.into()),
            ],
        );
        let report = validate_values(command.schema.as_ref(), &map, Locale::En);
        assert_eq!(report.error("users"), Some("Must be at most 100"));
        assert_eq!(report.error("supportYears"), Some("Must be a whole number"));
        assert!(report.parsed.is_none());
    }

    #[test]
    fn missing_required_field_is_localized() {
        let command = volume_install();
        let report = validate_values(command.schema.as_ref(), &ParamValueMap::new(), Locale::Es);
        assert_eq!(report.error("licenseKey"), Some("Este campo es obligatorio"));
    }

    #[test]
    fn number_field_rejects_unparsed_text() {
        let err = check_field(&FieldConstraint::number(), Some(&"12a".into())).unwrap_err();
        assert_eq!(err, Message::ExpectedNumber);
    }

    #[test]
    fn text_constraints_count_characters_and_check_allowed_values() {
        let constraint = FieldConstraint::text().length(1, 3);
        assert!(check_field(&constraint, Some(&"ñañ".into())).is_ok());
        assert_eq!(check_field(&constraint, Some(&"abcd".into())), Err(Message::TooLong(3)));

        let choice = FieldConstraint::text().one_of(["set", "remove"]);
        assert!(check_field(&choice, Some(&"set".into())).is_ok());
        assert!(matches!(check_field(&choice, Some(&"drop".into())), Err(Message::NotAllowed(_))));

        let optional = FieldConstraint::text().pattern("^[0-9]+$").optional();
        assert!(check_field(&optional, None).is_ok());
        assert_eq!(check_field(&optional, Some(&"x1".into())), Err(Message::PatternMismatch));
    }

    #[test]
    fn no_schema_means_valid() {
        let report = validate_values(None, &ParamValueMap::new(), Locale::En);
        assert!(report.is_valid());
        assert!(report.parsed.unwrap().is_empty());
    }

    #[test]
    fn known_paths() {
        for good in [
            "C:\\Backups\\",
            "c:\\data\\file.bak",
            "D:\\",
            "\\\\fileserver\\share",
            "\\\\fileserver\\share\\nested\\dump.zip",
            ".\\backups\\today",
            "..\\up\\file",
            "Backups\\",
        ] {
            assert!(is_windows_path(good), "expected {good:?} to be accepted");
        }
        for bad in ["/etc/passwd", "a:b", "backup.zip", "C:/Backups", "C:folder\\x", "C:\\a|b", ""] {
            assert!(!is_windows_path(bad), "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn path_heuristic_inspects_first_path_like_parameter() {
        let command = CommandCatalog::new(Locale::En).get("restore_data").unwrap();
        let map = values(&command, &[("restorePath", "/etc/passwd".into())]);
        let rejection = check_path_heuristic(&map).unwrap_err();
        assert_eq!(rejection.param, "restorePath");

        let ok = values(&command, &[("restorePath", "C:\\Backups\\".into())]);
        assert!(check_path_heuristic(&ok).is_ok());

        let empty = values(&command, &[("restorePath", "".into())]);
        assert!(check_path_heuristic(&empty).is_ok());
    }

    #[test]
    fn parameters_without_paths_pass_the_heuristic() {
        let command = volume_install();
        let map = values(&command, &[("licenseKey", "/not/a/path".into())]);
        assert!(check_path_heuristic(&map).is_ok());
    }

    #[test]
    fn gate_requires_command_and_values() {
        let catalog = CommandCatalog::new(Locale::En);
        let update = catalog.get("update").unwrap();
        assert!(!execution_allowed(None, &ParamValueMap::new(), true, false));
        assert!(execution_allowed(Some(&update), &ParamValueMap::new(), true, false));
        assert!(!execution_allowed(Some(&update), &ParamValueMap::new(), true, true));

        let install = volume_install();
        let partial = values(&install, &[("licenseKey", "K".into())]);
        assert!(!execution_allowed(Some(&install), &partial, true, false));
    }

    const SEGMENT: &str = "[A-Za-z0-9_ .-]{1,12}";
    const FILE: &str = "[A-Za-z0-9_ .-]{0,12}";

    proptest! {
        #[test]
        fn drive_rooted_paths_match(
            drive in "[a-zA-Z]",
            segments in prop::collection::vec(SEGMENT, 0..5),
            file in FILE,
        ) {
            let path = format!("{drive}:\\{}{file}", segments.iter().map(|s| format!("{s}\\")).collect::<String>());
            prop_assert!(is_windows_path(&path), "{}", path);
        }

        #[test]
        fn unc_paths_match(
            server in SEGMENT,
            share in SEGMENT,
            rest in prop::collection::vec(SEGMENT, 0..4),
        ) {
            let path = format!("\\\\{server}\\{share}{}", rest.iter().map(|s| format!("\\{s}")).collect::<String>());
            prop_assert!(is_windows_path(&path), "{}", path);
        }

        #[test]
        fn relative_paths_match(
            prefix in prop::sample::select(vec!["", ".\\", "..\\"]),
            dir in SEGMENT,
            file in FILE,
        ) {
            let path = format!("{prefix}{dir}\\{file}");
            prop_assert!(is_windows_path(&path), "{}", path);
        }

        #[test]
        fn reserved_characters_never_match(
            drive in "[a-zA-Z]",
            segments in prop::collection::vec(SEGMENT, 1..4),
            reserved in prop::sample::select(vec!['/', '*', '?', '<', '>', '|']),
            at in any::<Index>(),
        ) {
            let mut path = format!("{drive}:\\{}", segments.join("\\"));
            path.insert(at.index(path.len() + 1), reserved);
            prop_assert!(!is_windows_path(&path), "{}", path);
        }

        #[test]
        fn unix_paths_never_match(segments in prop::collection::vec("[a-z0-9]{1,8}", 1..5)) {
            let path = format!("/{}", segments.join("/"));
            prop_assert!(!is_windows_path(&path), "{}", path);
        }

        #[test]
        fn bare_names_never_match(name in SEGMENT) {
            prop_assert!(!is_windows_path(&name), "{}", name);
        }
    }
}
