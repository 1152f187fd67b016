//! HTML helper functions

/// Escape HTML special characters in text content.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    html_escape(s)
}
