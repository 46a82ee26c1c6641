//! Response definitions
//!
//! Represents replies to the peer and their term shapes:
//!
//! ```text
//! {selected, [Col, ...], [{Cell, ...}, ...]}
//! {num_rows, Count}
//! {error, {mysql_error, Code, Message}}
//! {ok, commit} | {ok, rollback}
//! ```

use crate::config::StringMode;
use crate::database::{DatabaseError, QueryResult};
use crate::term::Term;

/// Atom standing in for SQL NULL cells
pub const NULL_ATOM: &str = "null";

/// Acknowledged transaction command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Commit,
    Rollback,
}

/// A response to send to the peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Rows of a result set, in fetch order
    Selected {
        columns: Vec<Vec<u8>>,
        rows: Vec<Vec<Option<Vec<u8>>>>,
    },

    /// Rows affected by a statement without a result set
    NumRows(u64),

    /// Database-reported failure
    Error(DatabaseError),

    /// Commit or rollback acknowledgment
    Ok(Ack),
}

impl From<QueryResult> for Response {
    fn from(result: QueryResult) -> Self {
        match result {
            QueryResult::Selected { columns, rows } => Response::Selected { columns, rows },
            QueryResult::AffectedRowCount(count) => Response::NumRows(count),
            QueryResult::DatabaseError(err) => Response::Error(err),
        }
    }
}

impl Response {
    /// Build the reply term, consuming the response
    pub fn into_term(self, mode: StringMode) -> Term {
        let text = |bytes: Vec<u8>| match mode {
            StringMode::Charlist => Term::String(bytes),
            StringMode::Binary => Term::Binary(bytes),
        };

        match self {
            Response::Selected { columns, rows } => {
                let columns = columns.into_iter().map(text).collect();
                let rows = rows
                    .into_iter()
                    .map(|row| {
                        Term::Tuple(
                            row.into_iter()
                                .map(|cell| cell.map_or_else(|| Term::atom(NULL_ATOM), text))
                                .collect(),
                        )
                    })
                    .collect();
                Term::tuple(vec![
                    Term::atom("selected"),
                    Term::List(columns),
                    Term::List(rows),
                ])
            }
            Response::NumRows(count) => Term::tuple(vec![
                Term::atom("num_rows"),
                Term::Integer(i64::try_from(count).unwrap_or(i64::MAX)),
            ]),
            Response::Error(DatabaseError { code, message }) => Term::tuple(vec![
                Term::atom("error"),
                Term::tuple(vec![
                    Term::atom("mysql_error"),
                    Term::Integer(code as i64),
                    text(message),
                ]),
            ]),
            Response::Ok(ack) => Term::tuple(vec![
                Term::atom("ok"),
                Term::atom(match ack {
                    Ack::Commit => "commit",
                    Ack::Rollback => "rollback",
                }),
            ]),
        }
    }
}
