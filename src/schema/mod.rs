//! Table schemas read from the database catalog.
//!
//! A [`CatalogQuery`] produces the command describing a table; the rows it
//! returns are loaded into a [`SchemaTable`], whose columns mirror the
//! result set column for column.

mod catalog;
mod table;
mod value;

pub use catalog::{quote_identifier, quote_literal, CatalogQuery, Dialect, UnknownDialect};
pub use table::{SchemaColumn, SchemaTable};
pub use value::{Value, ValueKind};
