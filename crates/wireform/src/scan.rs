//! The raw literal scanner shared by every value-bearing token.
//!
//! After a lexer classifies a `Property`/`Str`/`Number`/`Boolean` token, the
//! literal text is harvested here. The scanner tracks two flags, `quoted`
//! and `escaped`: escaped characters never terminate or toggle anything,
//! and while quoted the whole terminator set is ordinary content. A `}` or
//! `]` consumed as terminator is handed back as a pending END token so the
//! caller never re-lexes the closing character.

use crate::{error::ParseError, source::Source, token::Token};

/// Result of one literal scan.
#[derive(Debug)]
pub struct Scanned {
    /// Harvested text, with one pair of surrounding quotes stripped and
    /// escape sequences decoded.
    pub text: String,
    /// Whether the literal was quoted on the wire.
    pub quoted: bool,
    /// END token for a closing `}`/`]` consumed as the terminator.
    pub pending: Option<Token>,
}

fn is_terminator(c: char) -> bool {
    matches!(c, ',' | ':' | '}' | ']' | '\n' | ' ' | '\t')
}

/// Scans one literal starting at the character currently under the cursor.
/// On return the cursor rests on the terminator (or at end of input); the
/// terminator is consumed but never part of the text.
pub fn scan_literal(src: &mut Source<'_>) -> Result<Scanned, ParseError> {
    let mut text = String::new();
    let mut quoted = false;
    let mut was_quoted = false;
    let mut escaped = false;
    let mut pending = None;

    let mut c = src.current();
    loop {
        let Some(ch) = c else {
            if quoted || escaped {
                return Err(ParseError::UnterminatedLiteral {
                    position: src.position(),
                });
            }
            break;
        };
        if escaped {
            text.push(decode_escape(src, ch)?);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            quoted = !quoted;
            was_quoted = true;
            text.push('"');
        } else if !quoted && is_terminator(ch) {
            match ch {
                '}' => pending = Some(Token::ObjectEnd),
                ']' => pending = Some(Token::ArrayEnd),
                _ => {}
            }
            break;
        } else {
            text.push(ch);
        }
        c = src.next()?;
    }

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text.pop();
        text.remove(0);
    }
    Ok(Scanned {
        text,
        quoted: was_quoted,
        pending,
    })
}

/// Decodes the character following a backslash. The JSON shorthands map to
/// the character they denote; anything else is taken verbatim, which keeps
/// escaped delimiters (`\"`, `\}`, `\]`) inert.
fn decode_escape(src: &mut Source<'_>, ch: char) -> Result<char, ParseError> {
    Ok(match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        'u' => decode_unicode_escape(src)?,
        other => other,
    })
}

/// Reads the four hex digits of a `\uXXXX` escape.
fn decode_unicode_escape(src: &mut Source<'_>) -> Result<char, ParseError> {
    let mut code = 0u32;
    for _ in 0..4 {
        let Some(c) = src.next()? else {
            return Err(src.unexpected_end());
        };
        let Some(digit) = c.to_digit(16) else {
            return Err(ParseError::InvalidEscape {
                detail: format!("'{c}' is not a hex digit"),
                position: src.position(),
            });
        };
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or_else(|| ParseError::InvalidEscape {
        detail: format!("U+{code:04X} is not a scalar value"),
        position: src.position(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Scanned {
        let mut src = Source::of_str(text);
        src.next().unwrap();
        scan_literal(&mut src).unwrap()
    }

    #[test]
    fn quoted_string_is_stripped() {
        let s = scan("\"hello\"");
        assert_eq!(s.text, "hello");
        assert!(s.quoted);
        assert_eq!(s.pending, None);
    }

    #[test]
    fn quoted_content_keeps_terminator_characters() {
        let s = scan("\"a, b: c}\"");
        assert_eq!(s.text, "a, b: c}");
        assert_eq!(s.pending, None);
    }

    #[test]
    fn unquoted_stops_at_comma() {
        let s = scan("200,\"next\"");
        assert_eq!(s.text, "200");
        assert!(!s.quoted);
        assert_eq!(s.pending, None);
    }

    #[test]
    fn closing_brace_becomes_pending_token() {
        let s = scan("200}");
        assert_eq!(s.text, "200");
        assert_eq!(s.pending, Some(Token::ObjectEnd));
    }

    #[test]
    fn closing_bracket_after_quote_becomes_pending_token() {
        let s = scan("\"b\"]");
        assert_eq!(s.text, "b");
        assert_eq!(s.pending, Some(Token::ArrayEnd));
    }

    #[test]
    fn escapes_decode_to_their_characters() {
        let s = scan(r#""a\nb\tc\\d\"e""#);
        assert_eq!(s.text, "a\nb\tc\\d\"e");
    }

    #[test]
    fn escaped_brace_is_content() {
        let s = scan(r"a\}b}");
        assert_eq!(s.text, "a}b");
        assert_eq!(s.pending, Some(Token::ObjectEnd));
    }

    #[test]
    fn unicode_escape() {
        let s = scan("\"A\\u00E9\"");
        assert_eq!(s.text, "A\u{00e9}");
    }

    #[test]
    fn value_that_is_only_escaped_quotes() {
        // "\"abc\"" on the wire: the inner quotes survive, the outer pair
        // is stripped exactly once.
        let s = scan(r#""\"abc\"""#);
        assert_eq!(s.text, "\"abc\"");
    }

    #[test]
    fn unterminated_quote_fails() {
        let mut src = Source::of_str("\"abc");
        src.next().unwrap();
        assert!(matches!(
            scan_literal(&mut src),
            Err(ParseError::UnterminatedLiteral { .. })
        ));
    }
}
