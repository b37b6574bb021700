//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pingate-tui")]
#[command(about = "PIN lock screen for a terminal wallet", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Credential file (defaults to the user data directory)
    #[arg(long, global = true)]
    pub pin_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the wallet behind the lock screen (default)
    Run,

    /// Set the 6-digit PIN, read twice from stdin
    SetPin,
}

impl Cli {
    /// The subcommand to execute, `run` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
