//! Format adapters.
//!
//! A [`Syntax`] owns both directions of one wire format: token
//! classification over a [`ReadContext`] and structural/scalar emission
//! into a [`WriteContext`]. The engines are format-agnostic and only ever
//! speak this contract.

use crate::{
    context::{ReadContext, WriteContext},
    error::ParseError,
    token::Token,
};

mod json;
mod yaml;

pub use json::Json;
pub use yaml::Yaml;

/// One wire format: lexing rule plus writer.
pub trait Syntax {
    /// Classifies the next token. Skips to the next significant character
    /// and decides from it, consulting the context's open-token stack where
    /// a character is ambiguous. Literal text is *not* consumed here unless
    /// classification requires lookahead, in which case the harvested text
    /// is queued on the context.
    fn next_token(&self, cx: &mut ReadContext<'_>) -> Result<Token, ParseError>;

    fn open_object(&self, wx: &mut WriteContext);
    fn close_object(&self, wx: &mut WriteContext);
    /// Emits a key, including any leading indentation and the key/value
    /// separator.
    fn write_key(&self, wx: &mut WriteContext, key: &str);
    fn open_array(&self, wx: &mut WriteContext);
    fn close_array(&self, wx: &mut WriteContext);
    /// Emitted before every array element.
    fn element(&self, wx: &mut WriteContext);
    /// Separator between sibling entries.
    fn separate(&self, wx: &mut WriteContext);

    fn write_null(&self, wx: &mut WriteContext);
    fn write_bool(&self, wx: &mut WriteContext, value: bool);
    fn write_integer(&self, wx: &mut WriteContext, value: i64);
    fn write_float(&self, wx: &mut WriteContext, value: f64);
    fn write_string(&self, wx: &mut WriteContext, value: &str);
}
