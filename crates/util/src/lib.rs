//! Small helpers shared by the rconsole crates: configuration loading, path
//! expansion, secret redaction and HTTP response helpers.

use std::path::PathBuf;

use dirs_next::home_dir;
use once_cell::sync::Lazy;
use regex::Regex;

pub mod config;
pub mod http;

pub use config::{ConfigError, ConsoleConfig, config_root, default_config_path};

/// Directory name used under the platform configuration directory.
pub const APP_DIR_NAME: &str = "rconsole";

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+]+)",
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD))=([^\s]+)",
        r#"(?i)("(?:contrasena|password|webPassword|windowsPassword)"\s*:\s*)("[^"]*")"#,
        r"(?i)(cookie: )([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// Covers `KEY=value` style assignments, authorization and cookie headers, and
/// password fields inside JSON request bodies.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for re in SENSITIVE_PATTERNS.iter() {
        redacted = re
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}<redacted>")
            })
            .to_string();
    }
    redacted
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}

/// Reduce an arbitrary identifier to characters safe for a file name.
pub fn sanitize_file_component(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '@') { ch } else { '_' })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|ch| ch == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}
