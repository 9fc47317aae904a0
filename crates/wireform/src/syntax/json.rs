//! The JSON adapter.
//!
//! Classification is single-character: the first significant character
//! decides the token, with the open-token stack disambiguating `"` between
//! a property key and a string value. `:`/`,` are transparent separators.

use crate::{
    context::{ReadContext, WriteContext},
    error::ParseError,
    syntax::Syntax,
    token::Token,
    value::escape_string,
};

/// The JSON-like wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Syntax for Json {
    fn next_token(&self, cx: &mut ReadContext<'_>) -> Result<Token, ParseError> {
        loop {
            let Some(c) = cx.source.next_non_space()? else {
                return Ok(Token::End);
            };
            match c {
                '"' => {
                    return Ok(if cx.expecting_key() {
                        Token::Property
                    } else {
                        Token::Str
                    });
                }
                't' | 'f' => return Ok(Token::Boolean),
                'n' => {
                    cx.source.assert_next_are("ull")?;
                    return Ok(Token::Null);
                }
                '{' => {
                    cx.stage_open(0, true);
                    return Ok(Token::Object);
                }
                '[' => {
                    cx.stage_open(0, true);
                    return Ok(Token::Array);
                }
                '}' => return Ok(Token::ObjectEnd),
                ']' => return Ok(Token::ArrayEnd),
                ',' => cx.mark_key_expected(),
                ':' => {}
                c if c.is_ascii_digit() || c == '.' || c == '-' => return Ok(Token::Number),
                other => return Err(cx.source.unexpected(other)),
            }
        }
    }

    fn open_object(&self, wx: &mut WriteContext) {
        wx.sink.push('{');
        wx.enter();
    }

    fn close_object(&self, wx: &mut WriteContext) {
        let was_empty = wx.exit();
        if wx.pretty() && !was_empty {
            wx.sink.new_line();
            wx.sink.pad(2 * wx.depth());
        }
        wx.sink.push('}');
    }

    fn write_key(&self, wx: &mut WriteContext, key: &str) {
        if wx.pretty() {
            wx.sink.new_line();
            wx.sink.pad(2 * wx.depth());
        }
        wx.sink.push('"');
        wx.sink.push_str(&escape_string(key));
        wx.sink.push_str("\":");
        wx.mark_item();
    }

    fn open_array(&self, wx: &mut WriteContext) {
        wx.sink.push('[');
        wx.enter();
    }

    fn close_array(&self, wx: &mut WriteContext) {
        let was_empty = wx.exit();
        if wx.pretty() && !was_empty {
            wx.sink.new_line();
            wx.sink.pad(2 * wx.depth());
        }
        wx.sink.push(']');
    }

    fn element(&self, wx: &mut WriteContext) {
        if wx.pretty() {
            wx.sink.new_line();
            wx.sink.pad(2 * wx.depth());
        }
        wx.mark_item();
    }

    fn separate(&self, wx: &mut WriteContext) {
        wx.sink.push(',');
    }

    fn write_null(&self, wx: &mut WriteContext) {
        wx.sink.push_str("null");
    }

    fn write_bool(&self, wx: &mut WriteContext, value: bool) {
        wx.sink.push_bool(value);
    }

    fn write_integer(&self, wx: &mut WriteContext, value: i64) {
        wx.sink.push_integer(value);
    }

    fn write_float(&self, wx: &mut WriteContext, value: f64) {
        if value.is_finite() {
            wx.sink.push_float(value);
        } else {
            // JSON has no representation for non-finite numbers.
            wx.sink.push_str("null");
        }
    }

    fn write_string(&self, wx: &mut WriteContext, value: &str) {
        wx.sink.push('"');
        wx.sink.push_str(&escape_string(value));
        wx.sink.push('"');
    }
}
