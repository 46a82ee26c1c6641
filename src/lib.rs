//! # mysqlport
//!
//! A MySQL port program for Erlang/BEAM runtimes:
//! - Length-prefixed frames over stdin/stdout
//! - External term format encoding of every message
//! - Lock-step command dispatch against a single connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Peer runtime (port owner)                   │
//! └───────────────┬─────────────────────────────▲───────────────┘
//!           stdin │ {4-byte len, term}          │ stdout
//! ┌───────────────▼─────────────────────────────┴───────────────┐
//! │                     Frame Transport                         │
//! └───────────────┬─────────────────────────────▲───────────────┘
//!                 │                             │
//! ┌───────────────▼─────────────────────────────┴───────────────┐
//! │                       Term Codec                            │
//! └───────────────┬─────────────────────────────▲───────────────┘
//!                 │ Command                     │ Response
//! ┌───────────────▼─────────────────────────────┴───────────────┐
//! │                   Command Dispatcher                        │
//! └───────────────┬─────────────────────────────────────────────┘
//!                 │
//!          ┌──────▼──────┐
//!          │  Database   │
//!          │  (MySQL)    │
//!          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod logging;

pub mod term;
pub mod protocol;
pub mod database;
pub mod port;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PortError, Result};
pub use config::Config;
pub use port::Dispatcher;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mysqlport
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
