//! In-memory declared-schema mapping source.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use inflector::Inflector;
use tracing::debug;

use super::entity::{Entity, EntityMapping, EntityType, Property, PropertyMap};
use super::source::MappingSource;

/// Errors raised while registering mappings.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("entity name must not be blank")]
    BlankEntityName,

    #[error("entity '{0}' is already registered")]
    DuplicateEntity(String),

    #[error("entity '{entity}' declares field '{field}' more than once")]
    DuplicateField { entity: String, field: String },

    #[error("entity '{entity}' declares key '{key}' which is not one of its fields")]
    UnknownKeyField { entity: String, key: String },

    #[error("entity '{entity}' maps field '{field}' to a blank column")]
    BlankColumn { entity: String, field: String },

    #[error("failed to read mapping file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse mapping file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type MappingResult<T> = Result<T, MappingError>;

/// Naming rules applied where a mapping leaves names out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conventions {
    /// Unnamed tables take the plural of the entity name (`Order` -> `Orders`).
    pub pluralize_table_names: bool,
    /// Unnamed columns take the snake_case field name (`PlacedAt` -> `placed_at`).
    pub snake_case_columns: bool,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            pluralize_table_names: true,
            snake_case_columns: false,
        }
    }
}

impl Conventions {
    /// Table name for an entity without an explicit one.
    pub fn table_name(&self, entity: &str) -> String {
        if self.pluralize_table_names {
            entity.to_plural()
        } else {
            entity.to_string()
        }
    }

    /// Column name for a field without an explicit one.
    pub fn column_name(&self, field: &str) -> String {
        if self.snake_case_columns {
            field.to_snake_case()
        } else {
            field.to_string()
        }
    }
}

/// A mapping with every name resolved.
#[derive(Debug, Clone)]
struct ResolvedEntity {
    table: String,
    columns: Vec<(Property, String)>,
    key_columns: Vec<String>,
}

/// Registry of entity mappings.
///
/// Entities registered from Rust types are found by `TypeId`; every entity
/// is also found by name, so a type token falls back to a mapping loaded by
/// name (e.g. from a mapping file) when its type was never registered.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    conventions: Conventions,
    entities: Vec<ResolvedEntity>,
    by_name: HashMap<String, usize>,
    by_type: HashMap<TypeId, usize>,
}

impl ModelRegistry {
    /// Create an empty registry with default conventions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given conventions.
    pub fn with_conventions(conventions: Conventions) -> Self {
        Self {
            conventions,
            ..Default::default()
        }
    }

    pub fn conventions(&self) -> Conventions {
        self.conventions
    }

    /// Register a type that declares its own mapping.
    pub fn register<T: Entity>(&mut self) -> MappingResult<&mut Self> {
        let idx = self.insert(T::mapping())?;
        self.by_type.insert(TypeId::of::<T>(), idx);
        Ok(self)
    }

    /// Register a mapping by entity name only.
    pub fn register_mapping(&mut self, mapping: EntityMapping) -> MappingResult<&mut Self> {
        self.insert(mapping)?;
        Ok(self)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Registered entity names, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn insert(&mut self, mapping: EntityMapping) -> MappingResult<usize> {
        let resolved = self.resolve(&mapping)?;
        let name = mapping.name.trim().to_string();
        if self.by_name.contains_key(&name) {
            return Err(MappingError::DuplicateEntity(name));
        }

        debug!(
            entity = %name,
            table = %resolved.table,
            columns = resolved.columns.len(),
            "registered entity mapping"
        );

        let idx = self.entities.len();
        self.entities.push(resolved);
        self.by_name.insert(name, idx);
        Ok(idx)
    }

    fn resolve(&self, mapping: &EntityMapping) -> MappingResult<ResolvedEntity> {
        let entity = mapping.name.trim();
        if entity.is_empty() {
            return Err(MappingError::BlankEntityName);
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(mapping.fields.len());
        for field in &mapping.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(MappingError::DuplicateField {
                    entity: entity.to_string(),
                    field: field.name.clone(),
                });
            }

            let column = match &field.column {
                Some(column) if column.trim().is_empty() => {
                    return Err(MappingError::BlankColumn {
                        entity: entity.to_string(),
                        field: field.name.clone(),
                    })
                }
                Some(column) => column.clone(),
                None => self.conventions.column_name(&field.name),
            };
            columns.push((Property::new(entity, field.name.as_str()), column));
        }

        let key_columns = mapping
            .keys
            .iter()
            .map(|key| {
                columns
                    .iter()
                    .find(|(prop, _)| prop.name() == key)
                    .map(|(_, column)| column.clone())
                    .ok_or_else(|| MappingError::UnknownKeyField {
                        entity: entity.to_string(),
                        key: key.clone(),
                    })
            })
            .collect::<MappingResult<Vec<_>>>()?;

        let table = match &mapping.table {
            Some(table) if !table.trim().is_empty() => table.clone(),
            _ => self.conventions.table_name(entity),
        };

        Ok(ResolvedEntity {
            table,
            columns,
            key_columns,
        })
    }

    fn lookup(&self, entity: &EntityType) -> Option<&ResolvedEntity> {
        entity
            .type_id()
            .and_then(|id| self.by_type.get(&id))
            .or_else(|| self.by_name.get(entity.name()))
            .map(|&idx| &self.entities[idx])
    }
}

impl MappingSource for ModelRegistry {
    type Error = Infallible;

    fn resolve_table_name(&self, entity: &EntityType) -> Result<Option<String>, Self::Error> {
        Ok(self.lookup(entity).map(|e| e.table.clone()))
    }

    fn resolve_mappings(&self, entity: &EntityType) -> Result<Option<PropertyMap>, Self::Error> {
        Ok(self
            .lookup(entity)
            .map(|e| e.columns.iter().cloned().collect()))
    }

    fn resolve_key_names(&self, entity: &EntityType) -> Result<Vec<String>, Self::Error> {
        Ok(self
            .lookup(entity)
            .map(|e| e.key_columns.clone())
            .unwrap_or_default())
    }
}
