//! Entity descriptors and declared mappings.

use std::any::{self, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Runtime token for a mapped model type.
///
/// Built either from a Rust type ([`EntityType::of`]) or from an entity name
/// ([`EntityType::named`]) when the caller only knows the name at runtime.
/// A named token with a blank name stands for "no type" and is rejected by
/// every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityType {
    type_id: Option<TypeId>,
    name: String,
}

impl EntityType {
    /// Token for the Rust type `T`, named after its last path segment.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: Some(TypeId::of::<T>()),
            name: short_type_name(any::type_name::<T>()).to_string(),
        }
    }

    /// Token for an entity known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            type_id: None,
            name: name.into(),
        }
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rust type id, if the token was built from a type.
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// True when the token identifies nothing.
    pub fn is_blank(&self) -> bool {
        self.type_id.is_none() && self.name.trim().is_empty()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `my_app::model::Order<T>` -> `Order`
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A mapped field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Property {
    entity: String,
    name: String,
}

impl Property {
    pub fn new(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            name: name.into(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the entity declaring this field.
    pub fn declaring_entity(&self) -> &str {
        &self.entity
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.name)
    }
}

/// Field to column association for one entity.
pub type PropertyMap = HashMap<Property, String>;

/// Types that declare their own mapping.
pub trait Entity: 'static {
    fn mapping() -> EntityMapping;
}

/// A declared field, with an optional explicit column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub name: String,
    pub column: Option<String>,
}

/// Declared mapping of one entity.
///
/// Anything left out (table name, column names) is filled in by the
/// registry's [`Conventions`](super::Conventions).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMapping {
    pub name: String,
    pub table: Option<String>,
    pub fields: Vec<FieldMapping>,
    /// Key fields, in key order.
    pub keys: Vec<String>,
}

impl EntityMapping {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set an explicit table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add a field mapped by convention.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldMapping {
            name: name.into(),
            column: None,
        });
        self
    }

    /// Add a field mapped to an explicit column.
    pub fn field_as(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.fields.push(FieldMapping {
            name: name.into(),
            column: Some(column.into()),
        });
        self
    }

    /// Declare the key fields.
    pub fn key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = fields.into_iter().map(Into::into).collect();
        self
    }
}
