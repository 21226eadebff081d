//! Entity mapping layer.
//!
//! The service never computes table or column names itself; it asks a
//! [`MappingSource`]. This module defines that capability and ships the
//! declared-schema implementation, [`ModelRegistry`].
//!
//! # Example
//!
//! ```ignore
//! use tablemeta::mapping::{Entity, EntityMapping, ModelRegistry};
//!
//! struct Order;
//!
//! impl Entity for Order {
//!     fn mapping() -> EntityMapping {
//!         EntityMapping::new("Order")
//!             .field_as("Id", "OrderId")
//!             .field_as("Total", "OrderTotal")
//!             .key(["Id"])
//!     }
//! }
//!
//! let mut registry = ModelRegistry::new();
//! registry.register::<Order>()?;
//! ```

mod entity;
mod file;
mod registry;
mod source;

pub use entity::{Entity, EntityMapping, EntityType, FieldMapping, Property, PropertyMap};
pub use file::{EntityDefinition, MappingFile};
pub use registry::{Conventions, MappingError, MappingResult, ModelRegistry};
pub use source::MappingSource;
