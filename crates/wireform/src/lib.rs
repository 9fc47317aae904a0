//! A streaming, token-driven codec between textual wire formats (JSON-like
//! and YAML-like) and typed object graphs.
//!
//! The engine is format-agnostic: a [`Syntax`] adapter classifies grammar
//! events ([`Token`]s) over a character [`Source`] on read and renders
//! structure into a [`Sink`] on write. Typed decoding is driven by the
//! field tables a [`TypeModel`] supplies, and polymorphic targets resolve
//! their concrete type through a discriminator property registered in a
//! [`TypeRegistry`].
//!
//! ```rust
//! use wireform::{Codec, FieldSpec, Options, StaticModel, TypeDef, TypeRegistry, ValueType};
//!
//! let model = StaticModel::new();
//! model.define(
//!     "Player",
//!     TypeDef::new()
//!         .field(FieldSpec::new("name", ValueType::String))
//!         .field(FieldSpec::new("score", ValueType::Integer)),
//! );
//! let types = TypeRegistry::new();
//! let codec = Codec::new(&model, &types);
//!
//! let player = codec
//!     .decode(
//!         r#"{"name":"test","score":200}"#,
//!         &ValueType::object("Player"),
//!         Options::empty(),
//!     )
//!     .unwrap();
//! assert_eq!(
//!     codec.encode(&player, Options::empty()).unwrap(),
//!     r#"{"name":"test","score":200}"#
//! );
//! ```

mod context;
mod decode;
mod encode;
mod error;
mod model;
mod options;
mod registry;
mod scan;
mod sink;
mod source;
mod syntax;
mod token;
mod value;

pub use context::{Open, ReadContext, WriteContext};
pub use error::{ConfigError, Error, ParseError, SchemaError};
pub use model::{EmptyModel, FieldSpec, StaticModel, TypeDef, TypeModel, ValueType};
pub use options::Options;
pub use registry::{TypeRegistry, WriteFn, Writers, global_types, global_writers};
pub use sink::Sink;
pub use source::{CharRead, Position, Source};
pub use syntax::{Json, Syntax, Yaml};
pub use token::{Token, TokenDefaults, token_defaults};
pub use value::{Fields, Value};

/// One configured engine: a format adapter plus the model and registries
/// consulted during decoding and encoding. Registries are passed in by
/// reference so tests can wire isolated instances.
pub struct Codec<'a, S: Syntax = Json> {
    pub(crate) syntax: S,
    pub(crate) model: &'a dyn TypeModel,
    pub(crate) types: &'a TypeRegistry,
    pub(crate) writers: &'a Writers,
    pub(crate) defaults: &'a TokenDefaults,
}

impl<'a> Codec<'a, Json> {
    /// A JSON codec over the process-wide writer and token-default tables.
    #[must_use]
    pub fn new(model: &'a dyn TypeModel, types: &'a TypeRegistry) -> Self {
        Self::with_syntax(Json, model, types)
    }
}

impl<'a, S: Syntax> Codec<'a, S> {
    /// A codec for any format adapter.
    #[must_use]
    pub fn with_syntax(syntax: S, model: &'a dyn TypeModel, types: &'a TypeRegistry) -> Self {
        Self {
            syntax,
            model,
            types,
            writers: global_writers(),
            defaults: token_defaults(),
        }
    }

    /// Replaces the custom-writer table.
    #[must_use]
    pub fn with_writers(mut self, writers: &'a Writers) -> Self {
        self.writers = writers;
        self
    }

    /// Replaces the token-default table.
    #[must_use]
    pub fn with_token_defaults(mut self, defaults: &'a TokenDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

/// Decodes a document without a target type, inferring generic maps, lists
/// and scalars from its structure.
pub fn decode(text: &str) -> Result<Value, Error> {
    Codec::new(&EmptyModel, global_types()).decode(text, &ValueType::Any, Options::empty())
}

/// Encodes a value as JSON using the process-wide registries.
pub fn encode(value: &Value, options: Options) -> Result<String, Error> {
    Codec::new(&EmptyModel, global_types()).encode(value, options)
}
