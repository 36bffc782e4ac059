use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "collation", about = "Quire collation diagram tool", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the core library is linked
    Ping,

    /// Print the core library version
    Version,

    /// Print the filled diagram of a quire as JSON
    Diagram {
        /// Comma-separated leaves in order: `p` paired, `s` single,
        /// optionally labelled as `p:12r`
        pattern: String,

        /// Print the pairing units instead of the filled diagram
        #[arg(long)]
        units: bool,
    },
}
