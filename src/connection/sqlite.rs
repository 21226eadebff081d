//! SQLite connection backed by rusqlite.

use std::path::{Path, PathBuf};

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, Rows};
use tracing::{debug, trace};

use super::{Command, CommandType, ConnectionState, DataReader, DbConnection, ResultColumn};
use crate::schema::{quote_identifier, Value};

const MEMORY: &str = ":memory:";

/// Errors raised by [`SqliteConnection`].
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection is closed")]
    Closed,
}

/// A SQLite database opened lazily from a path.
///
/// Closing an in-memory connection discards its contents; use a file when
/// the schema must outlive a close.
#[derive(Debug)]
pub struct SqliteConnection {
    path: PathBuf,
    conn: Option<Connection>,
}

impl SqliteConnection {
    /// Closed connection to the database at `path` (`:memory:` for a
    /// private in-memory database).
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            conn: None,
        }
    }

    /// Closed connection to a fresh in-memory database.
    pub fn in_memory() -> Self {
        Self::new(MEMORY)
    }

    /// Wrap an already open rusqlite connection.
    pub fn from_connection(conn: Connection) -> Self {
        let path = conn
            .path()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(MEMORY));
        Self {
            path,
            conn: Some(conn),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying connection, when open.
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY
    }

    fn statement_text(command: &Command) -> String {
        match command.command_type {
            CommandType::Text => command.text.clone(),
            CommandType::TableDirect => format!("SELECT * FROM {}", quote_identifier(&command.text)),
        }
    }
}

impl DbConnection for SqliteConnection {
    type Error = SqliteError;

    fn state(&self) -> ConnectionState {
        if self.conn.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    fn open(&mut self) -> Result<(), Self::Error> {
        if self.conn.is_some() {
            return Ok(());
        }

        let conn = if self.is_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&self.path)?
        };
        debug!(path = %self.path.display(), "opened sqlite connection");
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                debug!(path = %self.path.display(), "closed sqlite connection");
                Ok(())
            }
            Err((conn, err)) => {
                self.conn = Some(conn);
                Err(err.into())
            }
        }
    }

    fn execute_reader<F, R>(&mut self, command: &Command, read: F) -> Result<R, Self::Error>
    where
        F: FnOnce(&mut dyn DataReader<Error = Self::Error>) -> Result<R, Self::Error>,
    {
        let conn = self.conn.as_ref().ok_or(SqliteError::Closed)?;
        let sql = Self::statement_text(command);
        trace!(sql = %sql, params = command.parameters.len(), "executing command");

        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<ResultColumn> = stmt
            .columns()
            .iter()
            .map(|c| ResultColumn::new(c.name(), c.decl_type()))
            .collect();

        let params = command.parameters.iter().map(to_sql_value);
        let rows = stmt.query(params_from_iter(params))?;

        let mut reader = SqliteReader { columns, rows };
        read(&mut reader)
    }
}

/// Reader over rows of a prepared statement.
struct SqliteReader<'stmt> {
    columns: Vec<ResultColumn>,
    rows: Rows<'stmt>,
}

impl DataReader for SqliteReader<'_> {
    type Error = SqliteError;

    fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    fn read_row(&mut self) -> Result<Option<Vec<Value>>, Self::Error> {
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };

        let values = (0..self.columns.len())
            .map(|idx| row.get_ref(idx).map(from_value_ref))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(values))
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Blob(b) => SqlValue::Blob(b.clone()),
    }
}
