//! In-memory schema table.

use std::fmt;

use serde::Serialize;

use super::value::{Value, ValueKind};
use crate::connection::{DataReader, ResultColumn};

/// A column of a [`SchemaTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaColumn {
    pub name: String,
    /// Type declared in the database, when the driver reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    /// Declared kind, or the kind of the first non-null value read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,
}

impl SchemaColumn {
    fn from_result(column: &ResultColumn) -> Self {
        Self {
            name: column.name.clone(),
            declared_type: column.declared_type.clone(),
            kind: column.declared_type.as_deref().map(ValueKind::from_declared),
        }
    }
}

/// Tabular copy of a result set, named after the table it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaTable {
    pub name: String,
    pub columns: Vec<SchemaColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl SchemaTable {
    /// Empty table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Read everything `reader` yields into a new table called `name`.
    pub fn load<E>(
        name: impl Into<String>,
        reader: &mut dyn DataReader<Error = E>,
    ) -> Result<Self, E> {
        let mut table = Self::new(name);
        table.columns = reader.columns().iter().map(SchemaColumn::from_result).collect();

        while let Some(row) = reader.read_row()? {
            for (column, value) in table.columns.iter_mut().zip(&row) {
                if column.kind.is_none() {
                    column.kind = value.kind();
                }
            }
            table.rows.push(row);
        }

        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of the column called `name` (ASCII case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The column called `name` (ASCII case-insensitive).
    pub fn column(&self, name: &str) -> Option<&SchemaColumn> {
        self.column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row(&self, idx: usize) -> Option<&[Value]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Every value of the column called `name`, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Plain-text grid: the table name, a header, a rule and one line per row.
impl fmt::Display for SchemaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        if self.columns.is_empty() {
            return Ok(());
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Value::to_string).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                cells
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        write_line(f, &header, &widths)?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;

        for row in &cells {
            let row: Vec<&str> = row.iter().map(String::as_str).collect();
            write_line(f, &row, &widths)?;
        }
        Ok(())
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[&str], widths: &[usize]) -> fmt::Result {
    let last = cells.len().saturating_sub(1);
    for (idx, cell) in cells.iter().enumerate() {
        if idx == last {
            write!(f, "{cell}")?;
        } else {
            let width = widths.get(idx).copied().unwrap_or(0);
            write!(f, "{cell:<width$} | ")?;
        }
    }
    writeln!(f)
}
