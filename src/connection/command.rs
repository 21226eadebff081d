//! Commands sent to a connection.

use crate::schema::Value;

/// How a command's text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandType {
    /// The text is an SQL statement.
    #[default]
    Text,
    /// The text is a table name; the command reads the whole table.
    TableDirect,
}

/// A command: text, interpretation and bound parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Command {
    pub text: String,
    pub command_type: CommandType,
    /// Positional parameters, bound in order.
    pub parameters: Vec<Value>,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            command_type: CommandType::Text,
            parameters: Vec::new(),
        }
    }

    /// Command reading every row of `table`.
    pub fn table_direct(table: impl Into<String>) -> Self {
        Self {
            text: table.into(),
            command_type: CommandType::TableDirect,
            parameters: Vec::new(),
        }
    }

    /// Bind the next positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.parameters.push(value.into());
        self
    }
}
