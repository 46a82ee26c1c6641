//! Database Module
//!
//! The gateway the dispatcher executes statements through.
//!
//! ## Responsibilities
//! - Execute one SQL statement and report rows, an affected count or an error
//! - Commit / roll back the connection's transaction on request
//!
//! Query-time failures are values ([`QueryResult::DatabaseError`]), never
//! `PortError`s: the port keeps serving after a bad statement.

#[cfg(feature = "mysql")]
pub mod mysql;

/// Client error code used when a failure carries no server error number
pub const CR_UNKNOWN_ERROR: u32 = 2000;

/// Outcome of executing one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// The statement produced a result set
    Selected {
        /// Column names, in database order
        columns: Vec<Vec<u8>>,
        /// Rows in fetch order; `None` cells are SQL NULL
        rows: Vec<Vec<Option<Vec<u8>>>>,
    },

    /// The statement produced no result set
    AffectedRowCount(u64),

    /// The database rejected the statement
    DatabaseError(DatabaseError),
}

/// Error number and message reported by the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    pub code: u32,
    pub message: Vec<u8>,
}

impl DatabaseError {
    pub fn new(code: u32, message: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// A single database connection
pub trait Database {
    /// Execute one statement
    fn execute(&mut self, sql: &[u8]) -> QueryResult;

    /// Commit the current transaction
    fn commit(&mut self) -> Result<(), DatabaseError> {
        match self.execute(b"COMMIT") {
            QueryResult::DatabaseError(err) => Err(err),
            _ => Ok(()),
        }
    }

    /// Roll back the current transaction
    fn rollback(&mut self) -> Result<(), DatabaseError> {
        match self.execute(b"ROLLBACK") {
            QueryResult::DatabaseError(err) => Err(err),
            _ => Ok(()),
        }
    }
}

impl<D: Database + ?Sized> Database for &mut D {
    fn execute(&mut self, sql: &[u8]) -> QueryResult {
        (**self).execute(sql)
    }

    fn commit(&mut self) -> Result<(), DatabaseError> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<(), DatabaseError> {
        (**self).rollback()
    }
}
