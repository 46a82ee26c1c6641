//! Command Dispatcher
//!
//! Runs the request/response cycle over one pair of streams.

use std::io::{Read, Write};

use crate::config::{Config, StringMode, TransactionMode};
use crate::database::Database;
use crate::error::Result;
use crate::protocol::{read_frame, write_frame, Ack, Command, Response};
use crate::term;

/// Serves commands from one peer against one database connection
pub struct Dispatcher<R, W, D> {
    /// Inbound frames
    reader: R,

    /// Outbound frames
    writer: W,

    /// The only connection; nothing else touches it
    database: D,

    string_mode: StringMode,
    transaction_mode: TransactionMode,
    max_frame_size: u32,

    /// Commands answered so far
    served: u64,
}

impl<R: Read, W: Write, D: Database> Dispatcher<R, W, D> {
    /// Create a dispatcher using the protocol settings in `config`
    pub fn new(reader: R, writer: W, database: D, config: &Config) -> Self {
        Self {
            reader,
            writer,
            database,
            string_mode: config.string_mode,
            transaction_mode: config.transaction_mode,
            max_frame_size: config.max_frame_size,
            served: 0,
        }
    }

    /// Serve until the peer closes the inbound stream
    ///
    /// Returns the number of commands answered. Any error is fatal to the
    /// port; the caller decides how to exit.
    pub fn run(&mut self) -> Result<u64> {
        tracing::debug!("waiting for commands");
        while self.step()? {}
        tracing::info!(served = self.served, "input closed");
        Ok(self.served)
    }

    /// Handle one inbound frame
    ///
    /// Returns `false` once the inbound stream has ended cleanly. The
    /// response is flushed before this returns.
    pub fn step(&mut self) -> Result<bool> {
        let frame = match read_frame(&mut self.reader, self.max_frame_size)? {
            Some(frame) => frame,
            None => return Ok(false),
        };
        tracing::debug!(len = frame.len(), "read message");

        let request = term::decode(frame.payload())?;
        drop(frame);

        let command = Command::from_term(&request).map_err(|e| {
            tracing::warn!("rejecting message {}: {}", request, e);
            e
        })?;

        let response = self.execute(command);
        let payload = term::encode(&response.into_term(self.string_mode))?;
        write_frame(&mut self.writer, &payload)?;

        self.served += 1;
        tracing::debug!(len = payload.len(), served = self.served, "wrote response");
        Ok(true)
    }

    /// Run a command against the database and build its response
    pub fn execute(&mut self, command: Command) -> Response {
        match command {
            Command::Query { sql } => self.handle_query(&sql),
            Command::Commit => self.handle_transaction(Ack::Commit),
            Command::Rollback => self.handle_transaction(Ack::Rollback),
        }
    }

    fn handle_query(&mut self, sql: &[u8]) -> Response {
        tracing::debug!("got query: {}", String::from_utf8_lossy(sql));

        let response = Response::from(self.database.execute(sql));
        match &response {
            Response::Selected { columns, rows } => {
                tracing::debug!(columns = columns.len(), rows = rows.len(), "result set");
            }
            Response::NumRows(count) => tracing::debug!(affected = count, "no result set"),
            Response::Error(err) => tracing::warn!(
                code = err.code,
                "query failed: {}",
                String::from_utf8_lossy(&err.message)
            ),
            Response::Ok(_) => {}
        }
        response
    }

    fn handle_transaction(&mut self, ack: Ack) -> Response {
        if self.transaction_mode == TransactionMode::Acknowledge {
            tracing::debug!(?ack, "acknowledging");
            return Response::Ok(ack);
        }

        let outcome = match ack {
            Ack::Commit => self.database.commit(),
            Ack::Rollback => self.database.rollback(),
        };
        match outcome {
            Ok(()) => Response::Ok(ack),
            Err(err) => {
                tracing::warn!(?ack, code = err.code, "transaction command failed");
                Response::Error(err)
            }
        }
    }

    /// Commands answered so far
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Take back the streams and the connection
    pub fn into_parts(self) -> (R, W, D) {
        (self.reader, self.writer, self.database)
    }
}
