//! Text helpers shared by log lines and labels.

/// Collapse whitespace and cut `s` to at most `max_chars` characters,
/// appending `...` when something was dropped.
pub fn preview(s: &str, max_chars: usize) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let kept: String = collapsed.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
