//! REPL input tokenizer
//!
//! Splits one input line into command arguments with shell-like quoting,
//! matching the classic redis-cli rules:
//!
//! - whitespace (space, tab, CR, LF, vertical tab, form feed) separates
//!   tokens and is otherwise discarded;
//! - double quotes recognize `\n \r \t \b \a` escapes, any other escaped
//!   character is taken literally (including `\"`);
//! - single quotes recognize only `\'`; everything else, backslash
//!   included, is literal;
//! - a closing quote must be followed by whitespace or end-of-line;
//! - outside quotes a bare backslash is a literal character.

use std::fmt;

/// Tokenization failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    /// End-of-line reached while still inside a quoted token
    UnterminatedQuote,

    /// Closing quote not followed by whitespace or end-of-line
    MalformedQuote { quote: char, found: char },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::UnterminatedQuote => write!(f, "Unterminated quotes."),
            SyntaxError::MalformedQuote { quote, found } => write!(
                f,
                "Expect '{}' followed by a space or nothing, got '{}'.",
                quote, found
            ),
        }
    }
}

impl std::error::Error for SyntaxError {}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{b}' | '\u{c}')
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'b' => '\u{8}',
        'a' => '\u{7}',
        other => other,
    }
}

/// Split a line into argument tokens.
///
/// Empty input (or input that is all whitespace) yields an empty vector,
/// not an error.
pub fn tokenize(line: &str) -> Result<Vec<String>, SyntaxError> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        while pos < len && is_blank(chars[pos]) {
            pos += 1;
        }
        if pos == len {
            break;
        }

        let mut in_quotes = false;
        let mut in_single_quotes = false;
        let mut done = false;
        let mut current = String::new();

        while !done {
            if pos == len {
                if in_quotes || in_single_quotes {
                    return Err(SyntaxError::UnterminatedQuote);
                }
                done = true;
            } else {
                let c = chars[pos];
                if in_quotes {
                    if c == '\\' && pos + 1 < len {
                        pos += 1;
                        current.push(unescape(chars[pos]));
                    } else if c == '"' {
                        if pos + 1 < len && !is_blank(chars[pos + 1]) {
                            return Err(SyntaxError::MalformedQuote {
                                quote: '"',
                                found: chars[pos + 1],
                            });
                        }
                        done = true;
                    } else {
                        current.push(c);
                    }
                } else if in_single_quotes {
                    if c == '\\' && pos + 1 < len && chars[pos + 1] == '\'' {
                        pos += 1;
                        current.push('\'');
                    } else if c == '\'' {
                        if pos + 1 < len && !is_blank(chars[pos + 1]) {
                            return Err(SyntaxError::MalformedQuote {
                                quote: '\'',
                                found: chars[pos + 1],
                            });
                        }
                        done = true;
                    } else {
                        current.push(c);
                    }
                } else if is_blank(c) {
                    done = true;
                } else if c == '"' {
                    in_quotes = true;
                } else if c == '\'' {
                    in_single_quotes = true;
                } else {
                    current.push(c);
                }
            }
            if pos < len {
                pos += 1;
            }
        }

        tokens.push(current);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(line: &str) -> Vec<String> {
        tokenize(line).unwrap()
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(ok("set foo bar"), vec!["set", "foo", "bar"]);
    }

    #[test]
    fn test_double_quoted_token() {
        assert_eq!(ok(r#"set "foo bar""#), vec!["set", "foo bar"]);
    }

    #[test]
    fn test_escaped_quote_inside_double_quotes() {
        assert_eq!(ok(r#"set "foo bar\" baz""#), vec!["set", r#"foo bar" baz"#]);
    }

    #[test]
    fn test_known_escapes() {
        assert_eq!(ok(r#""a\tb\nc""#), vec!["a\tb\nc"]);
        assert_eq!(ok(r#""\a\b""#), vec!["\u{7}\u{8}"]);
    }

    #[test]
    fn test_unknown_escape_is_literal() {
        assert_eq!(ok(r#""fo\o""#), vec!["foo"]);
    }

    #[test]
    fn test_single_quotes_only_escape_single_quote() {
        assert_eq!(ok(r"set 'it\'s'"), vec!["set", "it's"]);
        assert_eq!(ok(r"'a\tb'"), vec![r"a\tb"]);
    }

    #[test]
    fn test_bare_backslash_outside_quotes_is_literal() {
        assert_eq!(ok(r"set \  bar"), vec!["set", r"\", "bar"]);
    }

    #[test]
    fn test_whitespace_separators() {
        assert_eq!(ok("  set    foo  \r \n  bar  \u{b} "), vec!["set", "foo", "bar"]);
    }

    #[test]
    fn test_all_quoted() {
        assert_eq!(ok(r#""set" "foo" "bar""#), vec!["set", "foo", "bar"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(ok(""), Vec::<String>::new());
        assert_eq!(ok("   \t "), Vec::<String>::new());
    }

    #[test]
    fn test_unterminated_double_quote() {
        assert_eq!(tokenize(r#"set foo "bar"#), Err(SyntaxError::UnterminatedQuote));
    }

    #[test]
    fn test_unterminated_single_quote() {
        assert_eq!(tokenize("set foo 'bar"), Err(SyntaxError::UnterminatedQuote));
    }

    #[test]
    fn test_closing_quote_must_be_followed_by_blank() {
        assert_eq!(
            tokenize(r#"set foo "bar"dsf"#),
            Err(SyntaxError::MalformedQuote { quote: '"', found: 'd' })
        );
        assert_eq!(
            tokenize("set 'bar'x"),
            Err(SyntaxError::MalformedQuote { quote: '\'', found: 'x' })
        );
    }

    #[test]
    fn test_trailing_backslash_inside_quotes() {
        assert_eq!(tokenize(r#"set "bar\"#), Err(SyntaxError::UnterminatedQuote));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SyntaxError::UnterminatedQuote.to_string(), "Unterminated quotes.");
        assert_eq!(
            SyntaxError::MalformedQuote { quote: '"', found: 'd' }.to_string(),
            "Expect '\"' followed by a space or nothing, got 'd'."
        );
    }
}
