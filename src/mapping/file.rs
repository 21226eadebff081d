//! TOML mapping files.
//!
//! ```toml
//! [entities.Order]
//! table = "Orders"
//! keys = ["Id"]
//! fields = ["PlacedAt"]
//!
//! [entities.Order.columns]
//! Id = "OrderId"
//! Total = "OrderTotal"
//! ```
//!
//! A field's column comes from `columns` when present, otherwise from the
//! registry conventions. `fields` lists fields mapped purely by convention.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::entity::EntityMapping;
use super::registry::{Conventions, MappingResult, ModelRegistry};

/// Parsed mapping file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MappingFile {
    #[serde(default)]
    pub entities: BTreeMap<String, EntityDefinition>,
}

/// One `[entities.<Name>]` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EntityDefinition {
    pub table: Option<String>,
    pub keys: Vec<String>,
    pub fields: Vec<String>,
    pub columns: BTreeMap<String, String>,
}

impl EntityDefinition {
    fn to_mapping(&self, name: &str) -> EntityMapping {
        let mut mapping = EntityMapping::new(name).key(self.keys.iter().cloned());
        mapping.table = self.table.clone();

        for (field, column) in &self.columns {
            mapping = mapping.field_as(field.as_str(), column.as_str());
        }
        for field in &self.fields {
            if !self.columns.contains_key(field) {
                mapping = mapping.field(field.as_str());
            }
        }
        mapping
    }
}

impl MappingFile {
    /// Parse a mapping document.
    pub fn parse(content: &str) -> MappingResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a mapping file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> MappingResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Declared mappings, in entity name order.
    pub fn mappings(&self) -> Vec<EntityMapping> {
        self.entities
            .iter()
            .map(|(name, def)| def.to_mapping(name))
            .collect()
    }

    /// Build a registry holding every entity of this file.
    pub fn into_registry(self, conventions: Conventions) -> MappingResult<ModelRegistry> {
        let mut registry = ModelRegistry::with_conventions(conventions);
        for mapping in self.mappings() {
            registry.register_mapping(mapping)?;
        }
        Ok(registry)
    }
}

impl ModelRegistry {
    /// Load a registry from a TOML mapping file.
    pub fn from_file<P: AsRef<Path>>(path: P, conventions: Conventions) -> MappingResult<Self> {
        MappingFile::from_file(path)?.into_registry(conventions)
    }
}
