//! MappingSource trait definition.

use super::entity::{EntityType, PropertyMap};

/// Capability the metadata service needs from an ORM mapping layer.
///
/// Implementations answer for one entity at a time and must not cache on
/// the caller's behalf: each call returns a fresh value.
pub trait MappingSource {
    /// Error raised by the underlying mapping layer.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Mapped table name, or `None` if the entity is not mapped.
    fn resolve_table_name(&self, entity: &EntityType) -> Result<Option<String>, Self::Error>;

    /// Field to column mapping, or `None` if the entity is not mapped.
    fn resolve_mappings(&self, entity: &EntityType) -> Result<Option<PropertyMap>, Self::Error>;

    /// Primary-key column names in key order. Empty when there is no key.
    fn resolve_key_names(&self, entity: &EntityType) -> Result<Vec<String>, Self::Error>;
}

impl<M: MappingSource + ?Sized> MappingSource for &M {
    type Error = M::Error;

    fn resolve_table_name(&self, entity: &EntityType) -> Result<Option<String>, Self::Error> {
        (**self).resolve_table_name(entity)
    }

    fn resolve_mappings(&self, entity: &EntityType) -> Result<Option<PropertyMap>, Self::Error> {
        (**self).resolve_mappings(entity)
    }

    fn resolve_key_names(&self, entity: &EntityType) -> Result<Vec<String>, Self::Error> {
        (**self).resolve_key_names(entity)
    }
}

impl<M: MappingSource + ?Sized> MappingSource for Box<M> {
    type Error = M::Error;

    fn resolve_table_name(&self, entity: &EntityType) -> Result<Option<String>, Self::Error> {
        (**self).resolve_table_name(entity)
    }

    fn resolve_mappings(&self, entity: &EntityType) -> Result<Option<PropertyMap>, Self::Error> {
        (**self).resolve_mappings(entity)
    }

    fn resolve_key_names(&self, entity: &EntityType) -> Result<Vec<String>, Self::Error> {
        (**self).resolve_key_names(entity)
    }
}
