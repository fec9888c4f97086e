//! HTTP response helpers shared by the API client and the front ends.

/// Return a user-friendly error message for common HTTP status codes.
///
/// # Example
/// ```rust
/// use rconsole_util::http::status_error_message;
///
/// assert!(status_error_message(401).unwrap().contains("Unauthorized"));
/// assert!(status_error_message(404).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: sign in again or set RCONSOLE_EMAIL/RCONSOLE_PASSWORD".into()),
        403 => Some("Forbidden (403). Hint: your account lacks permission for this server or command".into()),
        502..=504 => Some(format!("Backend unavailable ({status_code}). Hint: check RCONSOLE_API_BASE and retry")),
        _ => None,
    }
}

/// Collapse whitespace and cut `text` to roughly `limit` bytes for log output.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}
