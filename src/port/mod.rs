//! Port Module
//!
//! The serving side of the port: one dispatcher, strictly lock-step.
//!
//! ## Architecture
//! - Block on the next inbound frame
//! - Decode, dispatch, run the statement to completion
//! - Write and flush exactly one response frame, then read again
//!
//! There is no pipelining: response N is on the wire before frame N+1 is
//! read.

mod dispatcher;

pub use dispatcher::Dispatcher;

use std::io::{Read, Write};

use crate::config::Config;
use crate::database::Database;
use crate::error::Result;

/// Serve `reader`/`writer` against `database` until the input closes
pub fn serve<R: Read, W: Write, D: Database>(
    reader: R,
    writer: W,
    database: D,
    config: &Config,
) -> Result<u64> {
    Dispatcher::new(reader, writer, database, config).run()
}
