//! Protocol Module
//!
//! Defines the port protocol spoken with the peer runtime.
//!
//! ## Framing
//! ```text
//! ┌──────────────┬─────────────────────────────┐
//! │ Len (4, BE)  │   Term payload (Len bytes)  │
//! └──────────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands (inbound)
//! - `{sql_query, SqlText}`
//! - `{sql_commit}`
//! - `{sql_rollback}`
//!
//! ### Responses (outbound)
//! - `{selected, Columns, Rows}`
//! - `{num_rows, Count}`
//! - `{error, {mysql_error, Code, Message}}`
//! - `{ok, commit}` / `{ok, rollback}`

mod command;
mod frame;
mod response;

pub use command::{Command, CommandType};
pub use frame::{read_frame, write_frame, Frame, HEADER_SIZE};
pub use response::{Ack, Response, NULL_ATOM};
