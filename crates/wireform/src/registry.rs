//! Process-wide registries: discriminator-based type resolution and custom
//! per-type writers.
//!
//! Both registries are read-mostly: populated during startup (or lazily on
//! first use of a type), then queried concurrently by decode/encode calls.
//! Writes take the exclusive lock; `clear` exists for test isolation.
//! Standalone instances can be constructed so tests never have to touch the
//! process-wide ones.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::{
    error::{ConfigError, SchemaError},
    model::TypeModel,
    sink::Sink,
    value::Value,
};

struct BaseEntry {
    property: String,
    /// discriminator value → concrete type name
    cases: HashMap<String, String>,
}

/// Discriminator registry: `(base type, property)` plus the value→concrete
/// mapping populated by case registration.
#[derive(Default)]
pub struct TypeRegistry {
    bases: RwLock<HashMap<String, BaseEntry>>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `base` as a polymorphic supertype discriminated by
    /// `property`. Re-registering with the same property is a no-op;
    /// changing the property of an existing base is a configuration error.
    pub fn register_base(
        &self,
        base: impl Into<String>,
        property: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let base = base.into();
        let property = property.into();
        let mut bases = self.bases.write();
        if let Some(existing) = bases.get(&base) {
            if existing.property != property {
                return Err(ConfigError::BaseConflict {
                    base,
                    property: existing.property.clone(),
                });
            }
            return Ok(());
        }
        tracing::debug!(base = %base, property = %property, "registering discriminated base");
        bases.insert(
            base,
            BaseEntry {
                property,
                cases: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Registers `concrete` under `value`, walking the ancestor chain
    /// reported by `model` to find the unique registered base. Zero or more
    /// than one discriminated ancestor is a configuration error, as is a
    /// value collision.
    pub fn register_case(
        &self,
        model: &dyn TypeModel,
        concrete: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let base = self.discriminated_ancestor(model, concrete)?;
        let mut bases = self.bases.write();
        let entry = bases
            .get_mut(&base)
            .ok_or_else(|| ConfigError::NoDiscriminatedAncestor(concrete.to_string()))?;
        if let Some(existing) = entry.cases.get(value) {
            if existing != concrete {
                return Err(ConfigError::DuplicateCase {
                    base,
                    value: value.to_string(),
                    existing: existing.clone(),
                });
            }
            return Ok(());
        }
        tracing::debug!(base = %base, value = %value, concrete = %concrete, "registering subtype");
        entry.cases.insert(value.to_string(), concrete.to_string());
        Ok(())
    }

    /// Case registration using the discriminator value the model declares
    /// for the type.
    pub fn register_declared(
        &self,
        model: &dyn TypeModel,
        concrete: &str,
    ) -> Result<(), ConfigError> {
        let value = model
            .discriminator_value_of(concrete)
            .ok_or_else(|| ConfigError::NoDiscriminatedAncestor(concrete.to_string()))?;
        self.register_case(model, concrete, &value)
    }

    /// Whether `type_name` was registered as a discriminated base.
    #[must_use]
    pub fn is_base(&self, type_name: &str) -> bool {
        self.bases.read().contains_key(type_name)
    }

    /// The discriminator property of a registered base.
    #[must_use]
    pub fn property_of(&self, base: &str) -> Option<String> {
        self.bases.read().get(base).map(|e| e.property.clone())
    }

    /// Resolves a discriminator value to the concrete type registered for
    /// `base`.
    pub fn resolve(
        &self,
        base: &str,
        property: &str,
        value: &str,
    ) -> Result<String, SchemaError> {
        let bases = self.bases.read();
        let entry = bases.get(base).ok_or_else(|| SchemaError::UnknownSubtype {
            base: base.to_string(),
            value: value.to_string(),
        })?;
        if entry.property != property {
            return Err(SchemaError::UnknownTypeProperty {
                base: base.to_string(),
                property: property.to_string(),
            });
        }
        entry
            .cases
            .get(value)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownSubtype {
                base: base.to_string(),
                value: value.to_string(),
            })
    }

    /// Drops every registration; test isolation hook.
    pub fn clear(&self) {
        self.bases.write().clear();
    }

    fn discriminated_ancestor(
        &self,
        model: &dyn TypeModel,
        concrete: &str,
    ) -> Result<String, ConfigError> {
        let bases = self.bases.read();
        let mut found: Option<String> = None;
        let mut cursor = model.base_of(concrete);
        // Bounded walk so a cyclic base declaration cannot hang registration.
        let mut remaining = 64u32;
        while let Some(ancestor) = cursor {
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            if bases.contains_key(&ancestor) {
                if let Some(first) = &found {
                    if *first != ancestor {
                        return Err(ConfigError::AmbiguousAncestry {
                            type_name: concrete.to_string(),
                            first: first.clone(),
                            second: ancestor,
                        });
                    }
                } else {
                    found = Some(ancestor.clone());
                }
            }
            cursor = model.base_of(&ancestor);
        }
        found.ok_or_else(|| ConfigError::NoDiscriminatedAncestor(concrete.to_string()))
    }
}

/// Custom scalar renderer for a named type.
pub type WriteFn = fn(&Value, &mut Sink);

/// Registry of per-type writer functions consulted before the generic
/// field-table writer.
#[derive(Default)]
pub struct Writers {
    table: RwLock<HashMap<String, WriteFn>>,
}

impl Writers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, type_name: impl Into<String>, writer: WriteFn) {
        self.table.write().insert(type_name.into(), writer);
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<WriteFn> {
        self.table.read().get(type_name).copied()
    }

    pub fn clear(&self) {
        self.table.write().clear();
    }
}

static GLOBAL_TYPES: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::new);
static GLOBAL_WRITERS: Lazy<Writers> = Lazy::new(Writers::new);

/// The process-wide discriminator registry.
#[must_use]
pub fn global_types() -> &'static TypeRegistry {
    &GLOBAL_TYPES
}

/// The process-wide custom-writer registry.
#[must_use]
pub fn global_writers() -> &'static Writers {
    &GLOBAL_WRITERS
}
