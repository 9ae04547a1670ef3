use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fl", about = concat!("fl v", env!("CARGO_PKG_VERSION"), " - a flight log with live lists"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./flightlog.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logbook file
    #[arg(short = 'f', long, global = true, default_value = "logbook.json")]
    pub logbook: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the logbook grouped by year, newest first
    List(ListArgs),
    /// Replay a script of edits and print the list updates they cause
    Replay(ReplayArgs),
    /// Validate the logbook file
    Check,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show flights whose aircraft, route or remarks contain TEXT
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON-lines script, one action per line (`#` starts a comment)
    pub script: PathBuf,
    /// Write the resulting logbook back to the logbook file
    #[arg(long)]
    pub save: bool,
}
