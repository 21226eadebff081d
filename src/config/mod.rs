//! Configuration module for tablemeta.
//!
//! Handles the config file, environment variable expansion and settings.

mod settings;

pub use settings::{
    expand_env_vars, DatabaseSettings, LoggingSettings, MappingSettings, SchemaSettings, Settings,
    SettingsError,
};
