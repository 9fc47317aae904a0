//! The YAML adapter.
//!
//! Covers the lenient subset configuration and entity documents exercise:
//! block mappings and sequences nested by two-space indentation, flow
//! collections with the bracketed rules, plain or double-quoted scalars,
//! and `#` comments. Plain scalars may not contain reserved characters or
//! whitespace; the writer quotes anything else, so every document it emits
//! reads back.
//!
//! Classification differs from the bracketed formats in that a plain
//! scalar must sometimes be scanned before it can be classified (a `key:`
//! introduces a mapping, anything else is a value). The harvested text is
//! queued on the context, and structural tokens discovered mid-scan use
//! the one-slot pending queue. Dedents close exactly one structure per
//! fetch: the significant character is stashed and re-examined until the
//! indent stacks agree.

use crate::{
    context::{ReadContext, WriteContext},
    error::ParseError,
    scan::{Scanned, scan_literal},
    syntax::Syntax,
    token::Token,
    value::escape_string,
};

/// The YAML-like wire format. Writes block style under `PRETTY` and flow
/// style otherwise; reads both.
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

impl Yaml {
    fn classify_scalar(
        &self,
        cx: &mut ReadContext<'_>,
        prefix: Option<char>,
    ) -> Result<Token, ParseError> {
        let mut scanned = scan_literal(&mut cx.source)?;
        if let Some(prefix) = prefix {
            scanned.text.insert(0, prefix);
        }
        let terminator = cx.source.current();

        if terminator == Some(':') && !in_flow(cx) {
            return self.classify_block_key(cx, scanned);
        }

        if cx.expecting_key() {
            // Flow mapping key; the `:` separator was consumed as the
            // scan terminator.
            cx.queue_literal(scanned.text);
            return Ok(Token::Property);
        }

        if let Some(token) = scanned.pending {
            cx.queue(token);
        }
        let value_in_block_object = cx
            .innermost()
            .is_some_and(|o| !o.flow && o.token == Token::Object);
        if value_in_block_object || terminator == Some(',') {
            cx.mark_key_expected();
        }
        Ok(content_token(cx, scanned))
    }

    /// A block-context scalar terminated by `:` is a mapping key. Depending
    /// on the open stack it continues the current mapping, starts a nested
    /// one, or first supplies the null value a dangling key was owed.
    fn classify_block_key(
        &self,
        cx: &mut ReadContext<'_>,
        scanned: Scanned,
    ) -> Result<Token, ParseError> {
        let col = key_column(cx, &scanned);
        match cx.innermost().copied() {
            Some(o) if !o.flow && o.token == Token::Object && o.indent == col => {
                if o.expect_key {
                    cx.queue_literal(scanned.text);
                    Ok(Token::Property)
                } else {
                    // The previous key had no value on its line: yield the
                    // implied null now, then this key from the queue.
                    cx.queue(Token::Property);
                    cx.queue_literal(scanned.text);
                    Ok(Token::Null)
                }
            }
            _ => {
                cx.stage_open(col, false);
                cx.queue(Token::Property);
                cx.queue_literal(scanned.text);
                Ok(Token::Object)
            }
        }
    }
}

impl Syntax for Yaml {
    fn next_token(&self, cx: &mut ReadContext<'_>) -> Result<Token, ParseError> {
        loop {
            let Some(c) = cx.source.next_non_space()? else {
                // End of input closes the remaining open structures one
                // per fetch before the final End.
                return Ok(match cx.innermost().map(|o| o.token) {
                    Some(Token::Object) => Token::ObjectEnd,
                    Some(Token::Array) => Token::ArrayEnd,
                    _ => Token::End,
                });
            };
            if c == '#' {
                cx.source.next_until(|c| c == '\n')?;
                continue;
            }

            let col = cx.source.position().column.saturating_sub(1);
            if let Some(open) = cx.innermost().copied() {
                if !open.flow && col < open.indent {
                    cx.source.stash_current();
                    return Ok(match open.token {
                        Token::Object => Token::ObjectEnd,
                        _ => Token::ArrayEnd,
                    });
                }
            }

            if in_flow(cx) {
                match c {
                    '{' => {
                        cx.stage_open(col, true);
                        return Ok(Token::Object);
                    }
                    '[' => {
                        cx.stage_open(col, true);
                        return Ok(Token::Array);
                    }
                    '}' => return Ok(Token::ObjectEnd),
                    ']' => return Ok(Token::ArrayEnd),
                    ',' => cx.mark_key_expected(),
                    ':' => {}
                    _ => return self.classify_scalar(cx, None),
                }
                continue;
            }

            match c {
                '{' => {
                    cx.stage_open(col, true);
                    return Ok(Token::Object);
                }
                '[' => {
                    cx.stage_open(col, true);
                    return Ok(Token::Array);
                }
                '-' => match cx.source.next()? {
                    Some(' ') | Some('\n') | None => {
                        let at_open_sequence = cx.innermost().is_some_and(|o| {
                            !o.flow && o.token == Token::Array && o.indent == col
                        });
                        if !at_open_sequence {
                            cx.stage_open(col, false);
                            return Ok(Token::Array);
                        }
                        // Entry marker of the open sequence; the value
                        // follows.
                    }
                    Some(_) => return self.classify_scalar(cx, Some('-')),
                },
                _ => return self.classify_scalar(cx, None),
            }
        }
    }

    fn open_object(&self, wx: &mut WriteContext) {
        if !wx.pretty() {
            wx.sink.push('{');
        }
        wx.enter();
    }

    fn close_object(&self, wx: &mut WriteContext) {
        let was_empty = wx.exit();
        if wx.pretty() {
            if was_empty {
                pad_scalar(wx);
                wx.sink.push_str("{}");
            }
        } else {
            wx.sink.push('}');
        }
    }

    fn write_key(&self, wx: &mut WriteContext, key: &str) {
        if wx.pretty() {
            if !(wx.sink.is_empty() || wx.sink.ends_with("- ")) {
                wx.sink.new_line();
                wx.sink.pad(2 * (wx.depth().saturating_sub(1)));
            }
            push_scalar_text(wx, key);
            wx.sink.push(':');
        } else {
            push_scalar_text(wx, key);
            wx.sink.push_str(": ");
        }
        wx.mark_item();
    }

    fn open_array(&self, wx: &mut WriteContext) {
        if !wx.pretty() {
            wx.sink.push('[');
        }
        wx.enter();
    }

    fn close_array(&self, wx: &mut WriteContext) {
        let was_empty = wx.exit();
        if wx.pretty() {
            if was_empty {
                pad_scalar(wx);
                wx.sink.push_str("[]");
            }
        } else {
            wx.sink.push(']');
        }
    }

    fn element(&self, wx: &mut WriteContext) {
        if wx.pretty() {
            if !wx.sink.is_empty() {
                wx.sink.new_line();
            }
            wx.sink.pad(2 * (wx.depth().saturating_sub(1)));
            wx.sink.push_str("- ");
        }
        wx.mark_item();
    }

    fn separate(&self, wx: &mut WriteContext) {
        if !wx.pretty() {
            wx.sink.push_str(", ");
        }
    }

    fn write_null(&self, wx: &mut WriteContext) {
        pad_scalar(wx);
        wx.sink.push_str("null");
    }

    fn write_bool(&self, wx: &mut WriteContext, value: bool) {
        pad_scalar(wx);
        wx.sink.push_bool(value);
    }

    fn write_integer(&self, wx: &mut WriteContext, value: i64) {
        pad_scalar(wx);
        wx.sink.push_integer(value);
    }

    fn write_float(&self, wx: &mut WriteContext, value: f64) {
        pad_scalar(wx);
        if value.is_finite() {
            wx.sink.push_float(value);
        } else {
            wx.sink.push_str("null");
        }
    }

    fn write_string(&self, wx: &mut WriteContext, value: &str) {
        pad_scalar(wx);
        push_scalar_text(wx, value);
    }
}

fn in_flow(cx: &ReadContext<'_>) -> bool {
    cx.innermost().is_some_and(|o| o.flow)
}

/// Column of the key that was just scanned: the scan consumed up to and
/// including the `:` terminator, so the key started at the current column
/// minus the key text and the separator.
fn key_column(cx: &ReadContext<'_>, scanned: &Scanned) -> usize {
    let width = scanned.text.chars().count() + if scanned.quoted { 2 } else { 0 } + 1;
    cx.source
        .position()
        .column
        .saturating_sub(width)
}

/// Classifies a scanned plain/quoted scalar by content and queues its text
/// for the literal read. `null` carries no literal.
fn content_token(cx: &mut ReadContext<'_>, scanned: Scanned) -> Token {
    if scanned.quoted {
        cx.queue_literal(scanned.text);
        return Token::Str;
    }
    if scanned.text == "null" || scanned.text == "~" {
        return Token::Null;
    }
    let token = if scanned.text == "true" || scanned.text == "false" {
        Token::Boolean
    } else if looks_numeric(&scanned.text) {
        Token::Number
    } else {
        Token::Str
    };
    cx.queue_literal(scanned.text);
    token
}

fn looks_numeric(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        && (text.parse::<i64>().is_ok() || text.parse::<f64>().is_ok())
}

/// Scalars sit one space after a `key:`; elsewhere they start where the
/// cursor already is.
fn pad_scalar(wx: &mut WriteContext) {
    if wx.pretty() && wx.sink.last_char() == Some(':') {
        wx.sink.push(' ');
    }
}

/// Plain text when the reader would classify it back as the same string;
/// double-quoted otherwise.
fn push_scalar_text(wx: &mut WriteContext, text: &str) {
    if is_plain_safe(text) {
        wx.sink.push_str(text);
    } else {
        wx.sink.push('"');
        wx.sink.push_str(&escape_string(text));
        wx.sink.push('"');
    }
}

fn is_plain_safe(text: &str) -> bool {
    if text.is_empty()
        || looks_numeric(text)
        || matches!(text, "null" | "~" | "true" | "false")
    {
        return false;
    }
    if text.starts_with('-') || text.starts_with('#') {
        return false;
    }
    text.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '@' | '+'))
}
