// Output formatting — terminal display for profiles, reports, and checks.

pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..."
/// when something was cut. Counts characters, not bytes, so multi-byte
/// text never panics.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
