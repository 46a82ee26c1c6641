//! Error types for mysqlport
//!
//! Every error here is fatal to the port: the top level logs it and exits
//! with [`PortError::exit_code`]. Per-query database failures are not errors
//! at this level, they travel back to the peer as response terms.

use thiserror::Error;

/// Result type alias using PortError
pub type Result<T> = std::result::Result<T, PortError>;

/// Exit status for bad startup arguments
pub const EXIT_BAD_ARGS: i32 = 1;

/// Exit status for I/O, codec, resource or connect failures
pub const EXIT_IO_FAILURE: i32 = 2;

/// Exit status for commands the port does not understand
pub const EXIT_UNKNOWN_COMMAND: i32 = 3;

/// Unified error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    // -------------------------------------------------------------------------
    // Term Codec Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Database Errors
    // -------------------------------------------------------------------------
    #[error("Connect error: {0}")]
    Connect(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PortError {
    /// Process exit status for this error class
    pub fn exit_code(&self) -> i32 {
        match self {
            PortError::Config(_) => EXIT_BAD_ARGS,
            PortError::UnknownCommand(_) | PortError::Protocol(_) => EXIT_UNKNOWN_COMMAND,
            PortError::Io(_)
            | PortError::Transport(_)
            | PortError::Decode(_)
            | PortError::Encode(_)
            | PortError::Connect(_) => EXIT_IO_FAILURE,
        }
    }
}
