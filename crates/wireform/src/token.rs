//! The grammar-event vocabulary shared by every format adapter.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::model::ValueType;

/// A single grammar event produced by a format's lexer.
///
/// Tokens are pure events: the literal text of a value-bearing token
/// (`Property`, `Str`, `Number`, `Boolean`) is harvested separately by the
/// raw literal scanner after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Object,
    ObjectEnd,
    Array,
    ArrayEnd,
    Property,
    Str,
    Number,
    Boolean,
    Null,
    End,
}

impl Token {
    /// Whether the token carries literal text to be harvested.
    #[must_use]
    pub fn bears_literal(self) -> bool {
        matches!(self, Self::Property | Self::Str | Self::Number | Self::Boolean)
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Object => "object",
            Self::ObjectEnd => "object-end",
            Self::Array => "array",
            Self::ArrayEnd => "array-end",
            Self::Property => "property",
            Self::Str => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::End => "end",
        })
    }
}

/// Process-wide table mapping value types to the token that introduces them
/// on the wire: textual types to `Str`, numeric to `Number`, aggregates to
/// `Object`. Named types can override their default at runtime, which lets a
/// consumer declare that e.g. a timestamp type travels as a string literal.
#[derive(Debug, Default)]
pub struct TokenDefaults {
    overrides: RwLock<HashMap<String, Token>>,
}

impl TokenDefaults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The token expected to introduce a value of `ty`.
    pub fn token_for(&self, ty: &ValueType) -> Token {
        if let ValueType::Object(name) = ty {
            if let Some(token) = self.overrides.read().get(name.as_str()) {
                return *token;
            }
        }
        match ty {
            ValueType::String => Token::Str,
            ValueType::Integer | ValueType::Float => Token::Number,
            ValueType::Boolean => Token::Boolean,
            ValueType::List(_) | ValueType::Set(_) | ValueType::Array(_) => Token::Array,
            ValueType::Object(_) | ValueType::Map(_) | ValueType::Any => Token::Object,
        }
    }

    /// Overrides the default token for a named type.
    pub fn register(&self, type_name: impl Into<String>, token: Token) {
        self.overrides.write().insert(type_name.into(), token);
    }

    /// Drops every override; test isolation hook.
    pub fn clear(&self) {
        self.overrides.write().clear();
    }
}

static GLOBAL: Lazy<TokenDefaults> = Lazy::new(TokenDefaults::new);

/// The process-wide token-default table.
#[must_use]
pub fn token_defaults() -> &'static TokenDefaults {
    &GLOBAL
}
