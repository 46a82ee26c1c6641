//! mysqlport Port Binary
//!
//! Connects to MySQL and serves port commands on stdin/stdout.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use mysqlport::config::{StringMode, TransactionMode};
use mysqlport::database::mysql::MySqlDatabase;
use mysqlport::error::EXIT_BAD_ARGS;
use mysqlport::{logging, Config, Dispatcher, Result};

/// mysqlport
#[derive(Parser, Debug)]
#[command(name = "mysqlport")]
#[command(about = "MySQL port program for Erlang runtimes")]
#[command(version)]
struct Args {
    /// MySQL server host
    host: String,

    /// MySQL server port
    port: u16,

    /// Database name
    database: String,

    /// Login user
    user: String,

    /// Login password
    password: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Largest inbound frame accepted, in bytes
    #[arg(long, default_value = "67108864")]
    max_frame_size: u32,

    /// Send text as binaries instead of character lists
    #[arg(long)]
    binary_strings: bool,

    /// Commit/rollback handling: 'ack' or 'forward'
    #[arg(long, default_value = "ack")]
    transactions: TransactionMode,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { EXIT_BAD_ARGS } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let mut builder = Config::builder()
        .host(args.host)
        .port(args.port)
        .database(args.database)
        .user(args.user)
        .password(args.password)
        .max_frame_size(args.max_frame_size)
        .transaction_mode(args.transactions);
    if let Some(path) = args.log_file {
        builder = builder.log_file(path);
    }
    if args.binary_strings {
        builder = builder.string_mode(StringMode::Binary);
    }
    let config = builder.build();

    if let Err(e) = logging::init(&config) {
        eprintln!("mysqlport: {}", e);
        process::exit(e.exit_code());
    }

    tracing::info!("mysqlport v{} starting up", mysqlport::VERSION);
    tracing::debug!(?config, "configuration");

    let code = match run(&config) {
        Ok(served) => {
            tracing::info!(served, "shutting down");
            0
        }
        Err(e) => {
            tracing::error!("{}", e);
            e.exit_code()
        }
    };
    process::exit(code);
}

/// Connect, then serve until stdin closes; the connection is closed on return
fn run(config: &Config) -> Result<u64> {
    let database = MySqlDatabase::connect(config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut dispatcher = Dispatcher::new(stdin.lock(), stdout.lock(), database, config);
    dispatcher.run()
}
