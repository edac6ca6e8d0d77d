//! Small character-based text helpers shared by the prompt and evidence code.

/// Number of characters (Unicode scalar values) in `text`.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to `max_chars` characters, appending `...` when anything was cut.
pub(crate) fn ellipsize(text: &str, max_chars: usize) -> String {
    let prefix = truncate_chars(text, max_chars);
    if prefix.len() == text.len() {
        text.to_string()
    } else {
        format!("{}...", prefix.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn collapse_whitespace_joins_lines() {
        assert_eq!(collapse_whitespace("  a\n\n b\t c  "), "a b c");
    }

    #[test]
    fn ellipsize_marks_cut_text() {
        assert_eq!(ellipsize("abcdef", 3), "abc...");
        assert_eq!(ellipsize("abc", 3), "abc");
    }
}
