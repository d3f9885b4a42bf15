//! Minimal markdown rendering for assistant chat turns.
//!
//! Handles what the assistant actually produces: `**bold**`, `*italic*`,
//! `` `code` ``, `#` headings, bullet lists and numbered lists. Anything else
//! passes through unchanged.

use colored::Colorize;

/// Render `text` for the terminal.
pub fn render_markdown(text: &str) -> String {
    text.lines().map(render_line).collect::<Vec<_>>().join("\n")
}

fn render_line(line: &str) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    if let Some(heading) = trimmed
        .strip_prefix("### ")
        .or_else(|| trimmed.strip_prefix("## "))
        .or_else(|| trimmed.strip_prefix("# "))
    {
        return format!("{}{}", indent, render_inline(heading).as_str().bold().underline());
    }

    if let Some(item) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("• "))
    {
        return format!("{}  {} {}", indent, "•".cyan(), render_inline(item));
    }

    if let Some((number, item)) = numbered_item(trimmed) {
        return format!(
            "{}  {} {}",
            indent,
            format!("{}.", number).as_str().cyan(),
            render_inline(item)
        );
    }

    format!("{}{}", indent, render_inline(trimmed))
}

fn numbered_item(line: &str) -> Option<(&str, &str)> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix(". ")?;
    Some((&line[..digits], rest))
}

/// Render inline spans. Unterminated markers are kept as literal text.
pub fn render_inline(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**")
            && let Some(end) = after.find("**")
            && end > 0
        {
            out.push_str(&after[..end].bold().to_string());
            rest = &after[end + 2..];
            continue;
        }
        if let Some(after) = rest.strip_prefix('`')
            && let Some(end) = after.find('`')
            && end > 0
        {
            out.push_str(&after[..end].cyan().to_string());
            rest = &after[end + 1..];
            continue;
        }
        if let Some(after) = rest.strip_prefix('*')
            && !after.starts_with(' ')
            && let Some(end) = after.find('*')
            && end > 0
        {
            out.push_str(&after[..end].italic().to_string());
            rest = &after[end + 1..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_inline_markers_are_stripped() {
        plain();
        assert_eq!(
            render_inline("The **Mug** is *great* for `coffee`."),
            "The Mug is great for coffee."
        );
    }

    #[test]
    fn test_unterminated_markers_stay_literal() {
        plain();
        assert_eq!(render_inline("5 * 3 and **open"), "5 * 3 and **open");
        assert_eq!(render_inline("a ` tick"), "a ` tick");
    }

    #[test]
    fn test_lists_and_headings() {
        plain();
        let rendered = render_markdown("# Verdict\n- cheap\n* sturdy\n2. Travel Mug\nplain");
        assert_eq!(
            rendered,
            "Verdict\n  • cheap\n  • sturdy\n  2. Travel Mug\nplain"
        );
    }

    #[test]
    fn test_multibyte_text_passes_through() {
        plain();
        assert_eq!(render_inline("マグ **カップ**"), "マグ カップ");
    }
}
