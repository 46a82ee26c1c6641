//! mysqlport CLI
//!
//! Drives a port program the way a peer runtime would: spawns it, sends
//! each statement as `{sql_query, Sql}` and prints the replies.

use std::path::PathBuf;
use std::process::{self, Command as Process, Stdio};

use clap::Parser;
use mysqlport::protocol::{read_frame, write_frame, Command};
use mysqlport::{term, PortError, Result};

/// mysqlport CLI
#[derive(Parser, Debug)]
#[command(name = "mysqlport-cli")]
#[command(about = "Send SQL through a mysqlport port program")]
struct Args {
    /// Port program to launch
    #[arg(long, default_value = "mysqlport")]
    program: PathBuf,

    /// MySQL server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// MySQL server port
    #[arg(long, default_value = "3306")]
    port: u16,

    /// Database name
    #[arg(short, long)]
    database: String,

    /// Login user
    #[arg(short, long)]
    user: String,

    /// Login password
    #[arg(short, long, default_value = "")]
    password: String,

    /// Send {sql_commit} after the statements
    #[arg(long)]
    commit: bool,

    /// SQL statements, run in order
    #[arg(required = true)]
    statements: Vec<String>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("mysqlport-cli: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(args: &Args) -> Result<()> {
    let mut child = Process::new(&args.program)
        .arg(&args.host)
        .arg(args.port.to_string())
        .arg(&args.database)
        .arg(&args.user)
        .arg(&args.password)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| PortError::Transport("port stdin unavailable".to_string()))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| PortError::Transport("port stdout unavailable".to_string()))?;

    let mut commands: Vec<Command> = args
        .statements
        .iter()
        .map(|sql| Command::Query {
            sql: sql.as_bytes().to_vec(),
        })
        .collect();
    if args.commit {
        commands.push(Command::Commit);
    }

    for command in &commands {
        write_frame(&mut stdin, &term::encode(&command.to_term())?)?;
        let frame = read_frame(&mut stdout, u32::MAX)?.ok_or_else(|| {
            PortError::Transport("port closed before replying".to_string())
        })?;
        println!("{}", term::decode(frame.payload())?);
    }

    // Closing stdin is the shutdown signal
    drop(stdin);
    let status = child.wait()?;
    if !status.success() {
        return Err(PortError::Transport(format!("port exited with {}", status)));
    }
    Ok(())
}
