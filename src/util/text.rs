//! Whitespace and line-ending handling for character data.

use std::borrow::Cow;

/// Collapses every run of XML whitespace to a single space and trims both ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(is_xml_whitespace).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Returns `true` for the four XML whitespace characters.
#[must_use]
pub fn is_xml_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Translates `\r\n` and lone `\r` into `\n`.
///
/// Borrows the input when it holds no carriage return.
#[must_use]
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            out.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("   \n\t ", "")]
    #[case("a", "a")]
    #[case("  a  ", "a")]
    #[case("a \n\n  b", "a b")]
    #[case("\r\nline one\r\n  line two\r\n", "line one line two")]
    fn test_normalize_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_whitespace(input), expected);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("x\r\ny", "x\ny")]
    #[case("x\ry", "x\ny")]
    #[case("\r\r\n\n", "\n\n\n")]
    #[case("end\r", "end\n")]
    fn test_normalize_newlines(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_newlines(input), expected);
    }

    #[test]
    fn test_normalize_newlines_borrows_without_carriage_return() {
        assert!(matches!(normalize_newlines("a\nb"), Cow::Borrowed("a\nb")));
    }

    #[test]
    fn test_non_breaking_space_is_kept() {
        assert_eq!(normalize_whitespace("a\u{a0}b"), "a\u{a0}b");
    }
}
