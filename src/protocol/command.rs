//! Command definitions
//!
//! Commands arrive as tuples tagged by an atom in element 0.

use crate::error::{PortError, Result};
use crate::term::Term;

/// Command types, named by their tag atom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Query,
    Commit,
    Rollback,
}

impl CommandType {
    /// The tag atom's name
    pub fn tag(&self) -> &'static str {
        match self {
            CommandType::Query => "sql_query",
            CommandType::Commit => "sql_commit",
            CommandType::Rollback => "sql_rollback",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `{sql_query, SqlText}`; SqlText is iodata
    Query { sql: Vec<u8> },

    /// `{sql_commit}`
    Commit,

    /// `{sql_rollback}`
    Rollback,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Query { .. } => CommandType::Query,
            Command::Commit => CommandType::Commit,
            Command::Rollback => CommandType::Rollback,
        }
    }

    /// Interpret a decoded term as a command
    ///
    /// Unknown tags yield `UnknownCommand`; any other shape problem is a
    /// `Protocol` error.
    pub fn from_term(term: &Term) -> Result<Command> {
        let elements = term
            .as_tuple()
            .ok_or_else(|| PortError::Protocol(format!("command is not a tuple: {}", term)))?;

        let tag = elements
            .first()
            .and_then(Term::as_atom)
            .ok_or_else(|| PortError::Protocol(format!("command has no tag atom: {}", term)))?;

        match tag.name() {
            "sql_query" => {
                let text = elements.get(1).ok_or_else(|| {
                    PortError::Protocol("sql_query without query text".to_string())
                })?;
                let sql = text.to_iodata_bytes().ok_or_else(|| {
                    PortError::Protocol(format!("query text is not iodata: {}", text))
                })?;
                Ok(Command::Query { sql })
            }
            "sql_commit" => Ok(Command::Commit),
            "sql_rollback" => Ok(Command::Rollback),
            other => Err(PortError::UnknownCommand(other.to_string())),
        }
    }

    /// Build the term a peer sends for this command
    pub fn to_term(&self) -> Term {
        let tag = Term::atom(self.command_type().tag());
        match self {
            Command::Query { sql } => Term::tuple(vec![tag, Term::binary(sql.clone())]),
            Command::Commit | Command::Rollback => Term::tuple(vec![tag]),
        }
    }
}
