//! Text utilities for TUI rendering.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string with ellipsis if it exceeds `max_width` columns.
///
/// Uses unicode width so wide characters (CJK, emoji) in profile values are
/// measured the way the terminal draws them.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width + 1 > max_width {
            break;
        }
        width += ch_width;
        truncated.push(ch);
    }
    truncated.push('…');
    truncated
}

/// Truncates in the middle, keeping both ends of long URLs visible.
pub fn truncate_middle(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width || max_width < 10 {
        return text.to_string();
    }
    let half = (max_width - 3) / 2;
    let head: String = chars[..half].iter().collect();
    let tail: String = chars[chars.len() - half..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("ana@example.com", 20), "ana@example.com");
        assert_eq!(truncate_with_ellipsis("ana@example.com", 6), "ana@e…");
        assert_eq!(truncate_with_ellipsis("山田太郎", 5), "山田…");
    }

    #[test]
    fn test_truncate_middle() {
        let url = "https://accounts.google.com/o/oauth2/v2/auth?client_id=abc";
        let short = truncate_middle(url, 21);
        assert_eq!(short, "https://a...nt_id=abc");
        assert_eq!(truncate_middle("short", 21), "short");
    }
}
