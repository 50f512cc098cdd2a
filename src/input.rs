//! Pre-tokenizer line rendering
//!
//! Interactive lines go through two rewrites before tokenizing: doubled
//! backslashes collapse into one, and `\xNN` hex escapes decode to their
//! code point. Malformed hex sequences are left untouched.

/// Render an input line for tokenization.
pub fn render_input(line: &str) -> String {
    decode_hex_escapes(&collapse_backslashes(line))
}

fn collapse_backslashes(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'\\') {
            chars.next();
        }
        out.push(c);
    }
    out
}

fn decode_hex_escapes(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\'
            && i + 3 < chars.len()
            && (chars[i + 1] == 'x' || chars[i + 1] == 'X')
            && chars[i + 2].is_ascii_hexdigit()
            && chars[i + 3].is_ascii_hexdigit()
        {
            let hi = chars[i + 2].to_digit(16).unwrap_or(0);
            let lo = chars[i + 3].to_digit(16).unwrap_or(0);
            if let Some(decoded) = char::from_u32(hi * 16 + lo) {
                out.push(decoded);
                i += 4;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_backslash_untouched() {
        assert_eq!(render_input("abc"), "abc");
    }

    #[test]
    fn test_single_backslash_kept() {
        assert_eq!(render_input(r"\abc"), r"\abc");
    }

    #[test]
    fn test_double_backslash_collapses() {
        assert_eq!(render_input(r"\\abc"), r"\abc");
    }

    #[test]
    fn test_triple_backslash() {
        assert_eq!(render_input(r"\\\abc"), r"\\abc");
    }

    #[test]
    fn test_quartic_backslash() {
        assert_eq!(render_input(r"\\\\abc"), r"\\abc");
    }

    #[test]
    fn test_hex_escape_decodes() {
        assert_eq!(render_input(r"\xfe"), "\u{fe}");
        assert_eq!(render_input(r"set key \x41\x42"), "set key AB");
    }

    #[test]
    fn test_malformed_hex_left_literal() {
        assert_eq!(render_input(r"\xzz"), r"\xzz");
        assert_eq!(render_input(r"\x4"), r"\x4");
    }
}
