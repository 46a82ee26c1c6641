//! Configuration for mysqlport
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::PortError;

/// Main configuration for a port process
#[derive(Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Database Connection
    // -------------------------------------------------------------------------
    /// MySQL server host name or IP
    pub host: String,

    /// MySQL server TCP port
    pub port: u16,

    /// Database (schema) to select after connecting
    pub database: String,

    /// Login user
    pub user: String,

    /// Login password (never logged)
    pub password: String,

    // -------------------------------------------------------------------------
    // Logging
    // -------------------------------------------------------------------------
    /// Append diagnostics to this file instead of stderr
    pub log_file: Option<PathBuf>,

    // -------------------------------------------------------------------------
    // Protocol
    // -------------------------------------------------------------------------
    /// Largest inbound frame accepted (bytes)
    pub max_frame_size: u32,

    /// How text values are encoded in responses
    pub string_mode: StringMode,

    /// What `sql_commit` / `sql_rollback` do besides acknowledging
    pub transaction_mode: TransactionMode,
}

/// Encoding used for column names, cells and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMode {
    /// Character lists (STRING_EXT), the classic port convention
    #[default]
    Charlist,

    /// Binaries (BINARY_EXT)
    Binary,
}

/// Behaviour of the commit/rollback commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    /// Reply `{ok, commit}` / `{ok, rollback}` without touching the
    /// connection. With autocommit on, every statement is already durable.
    #[default]
    Acknowledge,

    /// Run COMMIT / ROLLBACK on the connection before replying
    Forward,
}

impl FromStr for TransactionMode {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ack" | "acknowledge" => Ok(TransactionMode::Acknowledge),
            "forward" => Ok(TransactionMode::Forward),
            other => Err(PortError::Config(format!(
                "unknown transaction mode '{}' (expected 'ack' or 'forward')",
                other
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            log_file: None,
            max_frame_size: 64 * 1024 * 1024, // 64 MB
            string_mode: StringMode::Charlist,
            transaction_mode: TransactionMode::Acknowledge,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("log_file", &self.log_file)
            .field("max_frame_size", &self.max_frame_size)
            .field("string_mode", &self.string_mode)
            .field("transaction_mode", &self.transaction_mode)
            .finish()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the database name
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the login user
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.user = user.into();
        self
    }

    /// Set the login password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Log to a file (append mode) instead of stderr
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_file = Some(path.into());
        self
    }

    /// Set the inbound frame size limit (in bytes)
    pub fn max_frame_size(mut self, size: u32) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set how text values are encoded
    pub fn string_mode(mut self, mode: StringMode) -> Self {
        self.config.string_mode = mode;
        self
    }

    /// Set commit/rollback behaviour
    pub fn transaction_mode(mut self, mode: TransactionMode) -> Self {
        self.config.transaction_mode = mode;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
