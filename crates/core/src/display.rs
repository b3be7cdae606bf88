//! Display helpers for the admin table.

/// Characters of `url`/`cookie` shown while a row is collapsed.
pub const COLLAPSED_CHARS: usize = 30;

pub const ELLIPSIS: &str = "...";

/// First `max_chars` characters of `s` followed by an ellipsis, or `s`
/// unchanged when it already fits.
pub fn truncate_display(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &s[..cut]),
        None => s.to_string(),
    }
}

/// Collapsed or expanded rendering of a cell.
pub fn cell_text(s: &str, expanded: bool) -> String {
    if expanded {
        s.to_string()
    } else {
        truncate_display(s, COLLAPSED_CHARS)
    }
}
