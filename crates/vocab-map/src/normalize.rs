//! Label normalization for comparison.

/// Normalizes a label for comparison.
///
/// - Converts to lowercase
/// - Replaces `_`, `-` and `/` with spaces
/// - Drops everything except `a-z`, `0-9`, space and `%`
/// - Collapses whitespace
pub fn normalize_label(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace(['_', '-', '/'], " ");
    let kept: String = lowered
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, ' ' | '%'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
