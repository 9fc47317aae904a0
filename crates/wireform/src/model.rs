//! Consumer-supplied type descriptions.
//!
//! The engines never introspect user structs: they operate on the ordered
//! field tables a [`TypeModel`] hands them. [`StaticModel`] is the built-in
//! implementation, populated through builder registration; consumers with
//! their own metadata layer implement [`TypeModel`] directly.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::value::{Fields, Value};

/// The declared shape of a decodable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// Structure is inferred from the document.
    Any,
    String,
    Integer,
    Float,
    Boolean,
    /// A named aggregate described by the model's field table.
    Object(String),
    /// Ordered list of elements.
    List(Box<ValueType>),
    /// Unordered collection; duplicate elements are dropped on decode.
    Set(Box<ValueType>),
    /// Fixed-shape sequence; decodes like a list.
    Array(Box<ValueType>),
    /// String-keyed map with values of one declared type, encounter-ordered.
    Map(Box<ValueType>),
}

impl ValueType {
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    #[must_use]
    pub fn list(element: ValueType) -> Self {
        Self::List(Box::new(element))
    }

    #[must_use]
    pub fn set(element: ValueType) -> Self {
        Self::Set(Box::new(element))
    }

    #[must_use]
    pub fn array(element: ValueType) -> Self {
        Self::Array(Box::new(element))
    }

    #[must_use]
    pub fn map(value: ValueType) -> Self {
        Self::Map(Box::new(value))
    }

    /// Short kind name used in coercion diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Object(_) => "object",
            Self::List(_) | Self::Set(_) | Self::Array(_) => "sequence",
            Self::Map(_) => "map",
        }
    }

    /// The value a field of this type holds when nothing was ever assigned:
    /// zero for numbers, false for booleans, null for everything else.
    #[must_use]
    pub fn zero(&self) -> Value {
        match self {
            Self::Integer => Value::Integer(0),
            Self::Float => Value::Float(0.0),
            Self::Boolean => Value::Boolean(false),
            _ => Value::Null,
        }
    }
}

/// One serializable/deserializable field of a named type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub wire_name: String,
    pub value_type: ValueType,
    /// Explicit ordering hint; hinted fields are written before unhinted
    /// ones, which keep declaration order.
    pub order: Option<i32>,
    pub readable: bool,
    pub writable: bool,
    /// Field value on the default instance, when it differs from the
    /// type's zero value.
    pub default: Option<Value>,
}

impl FieldSpec {
    #[must_use]
    pub fn new(wire_name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            wire_name: wire_name.into(),
            value_type,
            order: None,
            readable: true,
            writable: true,
            default: None,
        }
    }

    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    #[must_use]
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The value this field carries on the type's default instance.
    #[must_use]
    pub fn default_or_zero(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.value_type.zero())
    }
}

/// Source of per-type metadata for the engines.
///
/// Implementations must be cheap to query repeatedly; the default-instance
/// lookup in particular runs once per skipped field under `NON_DEFAULT`.
pub trait TypeModel {
    /// Ordered field table for a named type, or `None` if unknown.
    fn fields_of(&self, type_name: &str) -> Option<Arc<[FieldSpec]>>;

    /// Lazily built default instance used for `NON_DEFAULT` comparisons.
    fn default_instance_of(&self, type_name: &str) -> Option<Arc<Value>>;

    /// Direct ancestor in the type hierarchy, if any.
    fn base_of(&self, type_name: &str) -> Option<String>;

    /// Discriminator value this concrete type travels under, if declared.
    fn discriminator_value_of(&self, type_name: &str) -> Option<String>;
}

/// Model that knows nothing; suits untyped decoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyModel;

impl TypeModel for EmptyModel {
    fn fields_of(&self, _: &str) -> Option<Arc<[FieldSpec]>> {
        None
    }

    fn default_instance_of(&self, _: &str) -> Option<Arc<Value>> {
        None
    }

    fn base_of(&self, _: &str) -> Option<String> {
        None
    }

    fn discriminator_value_of(&self, _: &str) -> Option<String> {
        None
    }
}

/// Builder-registered description of one named type.
#[derive(Debug, Clone, Default)]
pub struct TypeDef {
    fields: Vec<FieldSpec>,
    base: Option<String>,
    discriminator_value: Option<String>,
}

impl TypeDef {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    #[must_use]
    pub fn discriminator_value(mut self, value: impl Into<String>) -> Self {
        self.discriminator_value = Some(value.into());
        self
    }
}

struct TypeEntry {
    fields: Arc<[FieldSpec]>,
    base: Option<String>,
    discriminator_value: Option<String>,
}

/// [`TypeModel`] built from explicit registrations.
///
/// Default instances are assembled on first request from the field table
/// (declared default or the type's zero value per field) and cached.
#[derive(Default)]
pub struct StaticModel {
    types: RwLock<HashMap<String, TypeEntry>>,
    defaults: RwLock<HashMap<String, Arc<Value>>>,
}

impl StaticModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a named type.
    pub fn define(&self, type_name: impl Into<String>, def: TypeDef) {
        let type_name = type_name.into();
        tracing::debug!(type_name = %type_name, fields = def.fields.len(), "defining type");
        self.defaults.write().remove(&type_name);
        self.types.write().insert(
            type_name,
            TypeEntry {
                fields: def.fields.into(),
                base: def.base,
                discriminator_value: def.discriminator_value,
            },
        );
    }

    /// Drops every registered type and cached default instance.
    pub fn clear(&self) {
        self.types.write().clear();
        self.defaults.write().clear();
    }
}

impl TypeModel for StaticModel {
    fn fields_of(&self, type_name: &str) -> Option<Arc<[FieldSpec]>> {
        self.types.read().get(type_name).map(|e| e.fields.clone())
    }

    fn default_instance_of(&self, type_name: &str) -> Option<Arc<Value>> {
        if let Some(cached) = self.defaults.read().get(type_name) {
            return Some(cached.clone());
        }
        let fields = self.fields_of(type_name)?;
        let mut instance = Fields::typed(type_name);
        for spec in fields.iter() {
            instance.insert(spec.wire_name.clone(), spec.default_or_zero());
        }
        let instance = Arc::new(Value::Object(instance));
        self.defaults
            .write()
            .insert(type_name.to_string(), instance.clone());
        Some(instance)
    }

    fn base_of(&self, type_name: &str) -> Option<String> {
        self.types.read().get(type_name)?.base.clone()
    }

    fn discriminator_value_of(&self, type_name: &str) -> Option<String> {
        self.types
            .read()
            .get(type_name)?
            .discriminator_value
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_instance_uses_zero_values() {
        let model = StaticModel::new();
        model.define(
            "Player",
            TypeDef::new()
                .field(FieldSpec::new("name", ValueType::String))
                .field(FieldSpec::new("score", ValueType::Integer)),
        );
        let instance = model.default_instance_of("Player").unwrap();
        let fields = instance.as_object().unwrap();
        assert_eq!(fields.get("name"), Some(&Value::Null));
        assert_eq!(fields.get("score"), Some(&Value::Integer(0)));
    }

    #[test]
    fn default_instance_honours_declared_defaults() {
        let model = StaticModel::new();
        model.define(
            "Job",
            TypeDef::new()
                .field(FieldSpec::new("retries", ValueType::Integer).default_value(3i64)),
        );
        let instance = model.default_instance_of("Job").unwrap();
        assert_eq!(
            instance.as_object().unwrap().get("retries"),
            Some(&Value::Integer(3))
        );
    }

    #[test]
    fn redefinition_invalidates_cached_default() {
        let model = StaticModel::new();
        model.define(
            "T",
            TypeDef::new().field(FieldSpec::new("n", ValueType::Integer)),
        );
        let _ = model.default_instance_of("T");
        model.define(
            "T",
            TypeDef::new()
                .field(FieldSpec::new("n", ValueType::Integer).default_value(7i64)),
        );
        assert_eq!(
            model
                .default_instance_of("T")
                .unwrap()
                .as_object()
                .unwrap()
                .get("n"),
            Some(&Value::Integer(7))
        );
    }
}
