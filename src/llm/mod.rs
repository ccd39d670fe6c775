pub mod advice;
pub mod client;
pub mod embeddings;
pub mod intent;
pub mod json;
pub mod rank;

/// Truncate to at most `max` characters (not bytes — garment descriptions
/// may be Chinese), appending an ellipsis when cut.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}
