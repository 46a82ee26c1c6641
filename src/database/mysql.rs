//! MySQL gateway
//!
//! [`Database`] over one blocking MySQL connection, using the text
//! protocol so every cell arrives as bytes or NULL.

use ::mysql::prelude::Queryable;
use ::mysql::{Conn, OptsBuilder, Value};

use super::{Database, DatabaseError, QueryResult, CR_UNKNOWN_ERROR};
use crate::config::Config;
use crate::error::{PortError, Result};

/// A connected MySQL session
pub struct MySqlDatabase {
    conn: Conn,
}

impl MySqlDatabase {
    /// Connect using the host, port, database and credentials in `config`
    pub fn connect(config: &Config) -> Result<Self> {
        let db_name = Some(config.database.clone()).filter(|name| !name.is_empty());
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.clone()))
            .tcp_port(config.port)
            .db_name(db_name)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()));

        let conn = Conn::new(opts).map_err(|e| {
            PortError::Connect(format!(
                "failed to connect to database '{}' at {}:{} as '{}': {}",
                config.database, config.host, config.port, config.user, e
            ))
        })?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            user = %config.user,
            "connected to MySQL"
        );
        Ok(Self { conn })
    }

    fn run(&mut self, sql: &str) -> ::mysql::Result<QueryResult> {
        let mut result = self.conn.query_iter(sql)?;

        let columns: Vec<Vec<u8>> = result
            .columns()
            .as_ref()
            .iter()
            .map(|column| column.name_ref().to_vec())
            .collect();

        if columns.is_empty() {
            return Ok(QueryResult::AffectedRowCount(result.affected_rows()));
        }

        for (i, column) in columns.iter().enumerate() {
            tracing::trace!("cols[{}]: {}", i, String::from_utf8_lossy(column));
        }

        let mut rows = Vec::new();
        for row in result.by_ref() {
            let cells: Vec<Option<Vec<u8>>> = row?
                .unwrap_raw()
                .into_iter()
                .map(|value| value.and_then(cell_bytes))
                .collect();
            rows.push(cells);
        }

        Ok(QueryResult::Selected { columns, rows })
    }
}

impl Database for MySqlDatabase {
    fn execute(&mut self, sql: &[u8]) -> QueryResult {
        let sql = match statement_text(sql) {
            Ok(sql) => sql,
            Err(err) => return QueryResult::DatabaseError(err),
        };
        match self.run(sql) {
            Ok(result) => result,
            Err(::mysql::Error::MySqlError(err)) => {
                QueryResult::DatabaseError(DatabaseError::new(err.code as u32, err.message))
            }
            Err(other) => {
                QueryResult::DatabaseError(DatabaseError::new(CR_UNKNOWN_ERROR, other.to_string()))
            }
        }
    }
}

impl Drop for MySqlDatabase {
    fn drop(&mut self) {
        tracing::debug!("closing MySQL connection");
    }
}

/// The statement as text; the client only sends UTF-8
fn statement_text(sql: &[u8]) -> std::result::Result<&str, DatabaseError> {
    std::str::from_utf8(sql).map_err(|e| {
        DatabaseError::new(
            CR_UNKNOWN_ERROR,
            format!("SQL is not valid UTF-8 (invalid byte at offset {})", e.valid_up_to()),
        )
    })
}

/// Text-protocol cell contents; `None` for NULL
fn cell_bytes(value: Value) -> Option<Vec<u8>> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(bytes),
        Value::Int(n) => Some(n.to_string().into_bytes()),
        Value::UInt(n) => Some(n.to_string().into_bytes()),
        Value::Float(f) => Some(f.to_string().into_bytes()),
        Value::Double(d) => Some(d.to_string().into_bytes()),
        other => Some(other.as_sql(true).trim_matches('\'').as_bytes().to_vec()),
    }
}
