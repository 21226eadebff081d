//! TOML-based configuration for tablemeta.
//!
//! Supports a config file (tablemeta.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [database]
//! driver = "sqlite"
//! path = "${DATA_DIR}/app.db"
//!
//! [schema]
//! policy = "restore"
//! query = "SELECT * FROM {ident} LIMIT 0"
//!
//! [mappings]
//! file = "mappings.toml"
//! pluralize_table_names = true
//! snake_case_columns = false
//!
//! [logging]
//! filter = "tablemeta=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::mapping::Conventions;
use crate::schema::{CatalogQuery, Dialect};
use crate::service::ConnectionPolicy;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unterminated variable reference in: {0}")]
    UnterminatedVar(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Database to read schemas from.
    pub database: DatabaseSettings,

    /// Schema fetch configuration.
    pub schema: SchemaSettings,

    /// Mapping source configuration.
    pub mappings: MappingSettings,

    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database driver (sqlite, mssql, postgres, duckdb).
    pub driver: String,

    /// Database path (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            path: None,
        }
    }
}

impl DatabaseSettings {
    /// Get the driver's dialect.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        self.driver
            .parse()
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Get the database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

/// Schema fetch configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaSettings {
    /// What to do with the connection after a fetch.
    pub policy: ConnectionPolicy,

    /// Custom catalog query template; the driver's built-in query otherwise.
    /// Taken verbatim: `$` here is SQL (`$1`), not an environment reference.
    pub query: Option<String>,
}

/// Mapping source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MappingSettings {
    /// Mapping file (supports ${ENV_VAR} expansion).
    pub file: Option<String>,

    /// Pluralize entity names into table names.
    pub pluralize_table_names: bool,

    /// Convert field names into snake_case column names.
    pub snake_case_columns: bool,
}

impl Default for MappingSettings {
    fn default() -> Self {
        let conventions = Conventions::default();
        Self {
            file: None,
            pluralize_table_names: conventions.pluralize_table_names,
            snake_case_columns: conventions.snake_case_columns,
        }
    }
}

impl MappingSettings {
    pub fn conventions(&self) -> Conventions {
        Conventions {
            pluralize_table_names: self.pluralize_table_names,
            snake_case_columns: self.snake_case_columns,
        }
    }

    /// Get the mapping file path with environment variables expanded.
    pub fn resolved_file(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.file
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TABLEMETA_CONFIG`
    /// 2. `./tablemeta.toml`
    /// 3. `~/.config/tablemeta/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("TABLEMETA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("tablemeta.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tablemeta").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Catalog query to use: the configured template, else the driver's.
    pub fn catalog_query(&self) -> Result<CatalogQuery, SettingsError> {
        match &self.schema.query {
            Some(template) => CatalogQuery::template(template.as_str())
                .map_err(|e| SettingsError::InvalidConfig(format!("schema.query: {e}"))),
            None => Ok(CatalogQuery::for_dialect(self.database.dialect()?)),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept as is.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                var_name.push(ch);
            }
            if !closed {
                return Err(SettingsError::UnterminatedVar(s.to_string()));
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
