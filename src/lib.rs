//! # tablemeta
//!
//! Entity mapping lookups and table schema retrieval.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   MetadataService                        │
//! │   table_name / mappings / key_names    table_schema      │
//! └─────────────────────────────────────────────────────────┘
//!              │                                │
//!              ▼                                ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │ MappingSource            │   │ DbConnection             │
//! │ (ModelRegistry, files)   │   │ (SqliteConnection)       │
//! └──────────────────────────┘   └──────────────────────────┘
//!                                               │ CatalogQuery
//!                                               ▼
//!                                ┌──────────────────────────┐
//!                                │ SchemaTable              │
//!                                └──────────────────────────┘
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod schema;
pub mod service;

pub use error::{MetadataError, MetadataResult};
pub use service::{ConnectionPolicy, MetadataService};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::connection::{
        Command, CommandType, ConnectionState, DataReader, DbConnection, ResultColumn,
        SqliteConnection, SqliteError,
    };
    pub use crate::error::{MetadataError, MetadataResult};
    pub use crate::mapping::{
        Conventions, Entity, EntityMapping, EntityType, MappingSource, ModelRegistry, Property,
        PropertyMap,
    };
    pub use crate::schema::{CatalogQuery, Dialect, SchemaColumn, SchemaTable, Value, ValueKind};
    pub use crate::service::{ConnectionPolicy, MetadataService};
}
