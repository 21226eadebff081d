//! Catalog queries: the SQL that describes a table's columns.
//!
//! Built-in queries select zero rows from the table itself, so the result
//! mirrors the table's columns. Both built-in and custom templates (from
//! configuration) splice the table name in through placeholders:
//!
//! - `{table}`: the name as an escaped string literal (`'Orders'`)
//! - `{ident}`: the name as a quoted identifier (`"Orders"`)
//!
//! Templates must parse as a single query statement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::connection::Command;
use crate::error::{MetadataError, MetadataResult};

const TABLE_PLACEHOLDER: &str = "{table}";
const IDENT_PLACEHOLDER: &str = "{ident}";

/// Error for an unrecognized dialect name.
#[derive(Debug, thiserror::Error)]
#[error("unsupported dialect: {0}. Supported: sqlite, mssql, postgres, duckdb")]
pub struct UnknownDialect(pub String);

/// Database dialects with a built-in catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    MsSql,
    Postgres,
    DuckDb,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MsSql => "mssql",
            Dialect::Postgres => "postgres",
            Dialect::DuckDb => "duckdb",
        }
    }

    /// Mirror query for this dialect: every column of the table, no rows.
    ///
    /// Selecting from the table itself means a missing table is a driver
    /// error rather than an empty result.
    pub fn catalog_template(self) -> &'static str {
        match self {
            Dialect::MsSql => "SELECT TOP 0 * FROM {ident}",
            Dialect::Sqlite | Dialect::Postgres | Dialect::DuckDb => {
                "SELECT * FROM {ident} LIMIT 0"
            }
        }
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "mssql" | "sqlserver" | "sql_server" => Ok(Dialect::MsSql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "duckdb" | "duck" => Ok(Dialect::DuckDb),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the schema of a table is queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    /// The dialect's built-in catalog query.
    Builtin(Dialect),
    /// A validated custom template.
    Template(String),
}

impl Default for CatalogQuery {
    fn default() -> Self {
        CatalogQuery::Builtin(Dialect::default())
    }
}

impl CatalogQuery {
    pub fn for_dialect(dialect: Dialect) -> Self {
        CatalogQuery::Builtin(dialect)
    }

    /// Validate and wrap a custom template.
    pub fn template(template: impl Into<String>) -> MetadataResult<Self> {
        let template = template.into();
        if !template.contains(TABLE_PLACEHOLDER) && !template.contains(IDENT_PLACEHOLDER) {
            return Err(MetadataError::invalid_argument(
                "query",
                "query template must contain {table} or {ident}",
            ));
        }

        let sample = render_template(&template, "tablemeta_sample");
        let statements = Parser::parse_sql(&GenericDialect {}, &sample).map_err(|e| {
            MetadataError::invalid_argument("query", format!("query template does not parse: {e}"))
        })?;

        match statements.as_slice() {
            [Statement::Query(_)] => Ok(CatalogQuery::Template(template)),
            [_] => Err(MetadataError::invalid_argument(
                "query",
                "query template must be a SELECT statement",
            )),
            _ => Err(MetadataError::invalid_argument(
                "query",
                format!(
                    "query template must hold exactly one statement, found {}",
                    statements.len()
                ),
            )),
        }
    }

    /// Command describing `table`.
    pub fn command_for(&self, table: &str) -> Command {
        match self {
            CatalogQuery::Builtin(dialect) => {
                Command::new(render_template(dialect.catalog_template(), table))
            }
            CatalogQuery::Template(template) => Command::new(render_template(template, table)),
        }
    }
}

/// Fill placeholders in one left-to-right pass. Substituted text is never
/// scanned again.
fn render_template(template: &str, table: &str) -> String {
    let mut out = String::with_capacity(template.len() + table.len() + 2);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(TABLE_PLACEHOLDER) {
            out.push_str(&quote_literal(table));
            rest = after;
        } else if let Some(after) = tail.strip_prefix(IDENT_PLACEHOLDER) {
            out.push_str(&quote_identifier(table));
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// `O'Brien` -> `'O''Brien'`
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `my "table"` -> `"my ""table"""`
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
