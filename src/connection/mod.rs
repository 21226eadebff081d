//! Database connection abstraction.
//!
//! The service needs very little from a driver: open/closed state, a way to
//! run one command, and a forward-only reader over the result. [`DbConnection`]
//! captures exactly that; [`SqliteConnection`] implements it over rusqlite.
//!
//! # Example
//!
//! ```ignore
//! use tablemeta::connection::{DbConnection, SqliteConnection};
//!
//! let mut conn = SqliteConnection::new("./app.db");
//! conn.open()?;
//! let command = conn.create_command("SELECT name FROM sqlite_master");
//! let names = conn.execute_reader(&command, |reader| {
//!     let mut names = Vec::new();
//!     while let Some(row) = reader.read_row()? {
//!         names.push(row);
//!     }
//!     Ok(names)
//! })?;
//! ```

mod command;
mod sqlite;

pub use command::{Command, CommandType};
pub use sqlite::{SqliteConnection, SqliteError};

use crate::schema::Value;

/// Open/closed state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

impl ConnectionState {
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }
}

/// Name and declared type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    pub name: String,
    /// Type as declared in the database, when the driver knows it.
    pub declared_type: Option<String>,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, declared_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.map(str::to_string),
        }
    }
}

/// Forward-only reader over a result set.
pub trait DataReader {
    type Error;

    /// Result columns, in result order.
    fn columns(&self) -> &[ResultColumn];

    /// Next row, or `None` once the result is exhausted.
    fn read_row(&mut self) -> Result<Option<Vec<Value>>, Self::Error>;
}

/// Connection capability used by the metadata service.
pub trait DbConnection {
    /// Error raised by the driver.
    type Error: std::error::Error + Send + Sync + 'static;

    fn state(&self) -> ConnectionState;

    /// Open the connection. Opening an open connection is a no-op.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Close the connection. Closing a closed connection is a no-op.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Create a text command for this connection.
    fn create_command(&self, text: &str) -> Command {
        Command::new(text)
    }

    /// Execute `command` and hand its reader to `read`.
    ///
    /// The statement and reader live only for the duration of `read`; they
    /// are released when it returns, whether it succeeded or not.
    fn execute_reader<F, R>(&mut self, command: &Command, read: F) -> Result<R, Self::Error>
    where
        F: FnOnce(&mut dyn DataReader<Error = Self::Error>) -> Result<R, Self::Error>;
}

impl<C: DbConnection> DbConnection for &mut C {
    type Error = C::Error;

    fn state(&self) -> ConnectionState {
        (**self).state()
    }

    fn open(&mut self) -> Result<(), Self::Error> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        (**self).close()
    }

    fn create_command(&self, text: &str) -> Command {
        (**self).create_command(text)
    }

    fn execute_reader<F, R>(&mut self, command: &Command, read: F) -> Result<R, Self::Error>
    where
        F: FnOnce(&mut dyn DataReader<Error = Self::Error>) -> Result<R, Self::Error>,
    {
        (**self).execute_reader(command, read)
    }
}
