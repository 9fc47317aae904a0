//! Error taxonomy for the codec.
//!
//! Three failure families, all fail-fast and non-retryable: [`ParseError`]
//! for lexical or structural violations (always positioned), [`SchemaError`]
//! for structurally valid input that does not fit the target type, and
//! [`ConfigError`] for registry misuse at startup. [`Error`] unifies them at
//! the public entry points.

use thiserror::Error;

use crate::{source::Position, token::Token};

/// Lexical or structural violation in the wire text. Carries the cursor
/// [`Position`] at which the violation was observed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected character '{found}' at {position}")]
    UnexpectedCharacter { found: char, position: Position },

    #[error("unexpected end of input at {position}")]
    UnexpectedEnd { position: Position },

    #[error("unterminated literal at {position}")]
    UnterminatedLiteral { position: Position },

    /// A fixed literal (`ull` after `n`, `rue` after `t`, ...) did not
    /// continue as expected.
    #[error("expected '{expected}' but found '{found}' at {position}")]
    MismatchedLiteral {
        expected: char,
        found: char,
        position: Position,
    },

    #[error("unexpected {token} token at {position}")]
    UnexpectedToken { token: Token, position: Position },

    #[error("invalid escape sequence at {position}: {detail}")]
    InvalidEscape { detail: String, position: Position },

    #[error("read failed at {position}")]
    Io {
        #[source]
        source: std::io::Error,
        position: Position,
    },
}

impl ParseError {
    /// The position at which the error was raised.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::UnexpectedCharacter { position, .. }
            | Self::UnexpectedEnd { position }
            | Self::UnterminatedLiteral { position }
            | Self::MismatchedLiteral { position, .. }
            | Self::UnexpectedToken { position, .. }
            | Self::InvalidEscape { position, .. }
            | Self::Io { position, .. } => *position,
        }
    }
}

/// Structurally valid input that does not match the target type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown property '{property}' for type {type_name}")]
    UnknownProperty { type_name: String, property: String },

    #[error("no fields registered for type {0}")]
    UnknownType(String),

    #[error("no subtype '{value}' registered for {base}")]
    UnknownSubtype { base: String, value: String },

    #[error("no type property '{property}' registered for {base}")]
    UnknownTypeProperty { base: String, property: String },

    /// Scalar coercion mismatch, named as expected vs. actual kind.
    #[error("expected {expected} but found {found}")]
    Mismatch {
        expected: &'static str,
        found: String,
    },

    #[error("invalid {kind} literal '{literal}'")]
    InvalidLiteral {
        kind: &'static str,
        literal: String,
    },
}

/// Registry misuse during startup or test wiring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no discriminated ancestor registered for type {0}")]
    NoDiscriminatedAncestor(String),

    #[error("type {type_name} has conflicting discriminated ancestors {first} and {second}")]
    AmbiguousAncestry {
        type_name: String,
        first: String,
        second: String,
    },

    #[error("discriminator value '{value}' already registered for {base} as {existing}")]
    DuplicateCase {
        base: String,
        value: String,
        existing: String,
    },

    #[error("base type {base} already registered with discriminator property '{property}'")]
    BaseConflict { base: String, property: String },
}

/// Unified error surfaced by the public `decode`/`encode` entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
