//! Shared utility functions.

/// Shorten `s` to at most `max_chars` characters for log previews, appending
/// `...` when anything was cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut chars = s.char_indices();
    match chars.nth(max_chars) {
        None => s.to_string(),
        Some((end, _)) => format!("{}...", &s[..end]),
    }
}
