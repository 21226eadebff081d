//! tablemeta CLI - Inspect entity mappings and table schemas
//!
//! Usage:
//!   tablemeta schema <table> [--db <path>] [--format text|json]
//!   tablemeta table-name <entity> [--mappings <file>]
//!   tablemeta mappings <entity> [--mappings <file>]
//!   tablemeta keys <entity> [--mappings <file>]
//!
//! Examples:
//!   tablemeta schema Orders --db ./data/app.db
//!   tablemeta mappings Order --mappings mappings.toml

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tablemeta::config::Settings;
use tablemeta::connection::SqliteConnection;
use tablemeta::logging;
use tablemeta::mapping::{EntityType, ModelRegistry};
use tablemeta::schema::Dialect;
use tablemeta::MetadataService;

#[derive(Parser)]
#[command(name = "tablemeta")]
#[command(about = "tablemeta - Inspect entity mappings and database table schemas")]
#[command(version)]
struct Cli {
    /// Path to a tablemeta.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema of a database table
    Schema {
        /// Table name
        table: String,

        /// SQLite database file (overrides database.path)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the table an entity is mapped to
    TableName {
        /// Entity name
        entity: String,

        /// Mapping file (overrides mappings.file)
        #[arg(short, long)]
        mappings: Option<PathBuf>,
    },

    /// Print an entity's field to column mappings
    Mappings {
        /// Entity name
        entity: String,

        /// Mapping file (overrides mappings.file)
        #[arg(short, long)]
        mappings: Option<PathBuf>,
    },

    /// Print an entity's primary-key columns
    Keys {
        /// Entity name
        entity: String,

        /// Mapping file (overrides mappings.file)
        #[arg(short, long)]
        mappings: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Plain-text grid
    Text,
    /// Pretty JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            logging::init(None);
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(Some(&settings.logging.filter));

    match cli.command {
        Commands::Schema { table, db, format } => cmd_schema(&settings, table, db, format),
        Commands::TableName { entity, mappings } => cmd_table_name(&settings, entity, mappings),
        Commands::Mappings { entity, mappings } => cmd_mappings(&settings, entity, mappings),
        Commands::Keys { entity, mappings } => cmd_keys(&settings, entity, mappings),
    }
}

fn cmd_schema(
    settings: &Settings,
    table: String,
    db: Option<PathBuf>,
    format: OutputFormat,
) -> ExitCode {
    match settings.database.dialect() {
        Ok(Dialect::Sqlite) => {}
        Ok(other) => {
            eprintln!("Error: no built-in connection for driver '{}'", other);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let path = match db.map(Ok).or_else(|| settings.database.resolved_path().transpose()) {
        Some(Ok(path)) => path,
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        None => {
            eprintln!("Error: no database given (use --db or set database.path)");
            return ExitCode::FAILURE;
        }
    };

    let catalog = match settings.catalog_query() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let registry = ModelRegistry::new();
    let mut service = MetadataService::new(&registry, SqliteConnection::new(&path))
        .with_catalog(catalog)
        .with_policy(settings.schema.policy);

    let schema = match service.table_schema(&table) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading schema of '{}': {}", table, e);
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Text => print!("{}", schema),
        OutputFormat::Json => match schema.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing schema: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn load_registry(settings: &Settings, mappings: Option<PathBuf>) -> Result<ModelRegistry, String> {
    let file = match mappings {
        Some(path) => path,
        None => settings
            .mappings
            .resolved_file()
            .map_err(|e| e.to_string())?
            .ok_or("no mapping file given (use --mappings or set mappings.file)")?,
    };

    ModelRegistry::from_file(&file, settings.mappings.conventions())
        .map_err(|e| format!("{}: {}", file.display(), e))
}

/// Run `f` against a service over the configured mappings.
fn with_service<F>(settings: &Settings, mappings: Option<PathBuf>, f: F) -> ExitCode
where
    F: FnOnce(&MetadataService<&ModelRegistry, SqliteConnection>) -> Result<bool, String>,
{
    let registry = match load_registry(settings, mappings) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Mapping lookups never open the connection.
    let service = MetadataService::new(&registry, SqliteConnection::in_memory());
    match f(&service) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_table_name(settings: &Settings, entity: String, mappings: Option<PathBuf>) -> ExitCode {
    with_service(settings, mappings, |service| {
        let entity = EntityType::named(entity);
        match service.table_name_of(&entity).map_err(|e| e.to_string())? {
            Some(table) => {
                println!("{}", table);
                Ok(true)
            }
            None => {
                eprintln!("{} is not mapped", entity);
                Ok(false)
            }
        }
    })
}

fn cmd_mappings(settings: &Settings, entity: String, mappings: Option<PathBuf>) -> ExitCode {
    with_service(settings, mappings, |service| {
        let entity = EntityType::named(entity);
        let Some(map) = service.mappings_of(&entity).map_err(|e| e.to_string())? else {
            eprintln!("{} is not mapped", entity);
            return Ok(false);
        };

        let mut pairs: Vec<_> = map.iter().collect();
        pairs.sort();
        for (property, column) in pairs {
            println!("{} -> {}", property.name(), column);
        }
        Ok(true)
    })
}

fn cmd_keys(settings: &Settings, entity: String, mappings: Option<PathBuf>) -> ExitCode {
    with_service(settings, mappings, |service| {
        let entity = EntityType::named(entity);
        for key in service.key_names_of(&entity).map_err(|e| e.to_string())? {
            println!("{}", key);
        }
        Ok(true)
    })
}
