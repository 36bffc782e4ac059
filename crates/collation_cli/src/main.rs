//! Collation command-line entry point.
//!
//! # Responsibility
//! - Parse a leaf pattern and print its filled diagram as JSON.
//! - Keep a tiny probe to verify `collation_core` linkage.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use collation_core::{
    build_filled_diagram, build_units, ensure_even_bifolia, init_logging_with, Leaf,
    LoggingConfig,
};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = init_logging(&cli) {
        eprintln!("error: {message}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), String> {
    let Some(dir) = cli.log_dir.as_ref() else {
        return Ok(());
    };
    let dir = dir
        .to_str()
        .ok_or_else(|| format!("log dir is not valid UTF-8: {}", dir.display()))?;
    let config = match cli.log_level.as_deref() {
        Some(level) => LoggingConfig::new(level, dir)?,
        None => LoggingConfig::with_default_level(dir)?,
    };
    init_logging_with(&config)
}

fn run(command: Commands) -> Result<String, String> {
    match command {
        Commands::Ping => Ok(format!("collation_core ping={}", collation_core::ping())),
        Commands::Version => Ok(format!(
            "collation_core version={}",
            collation_core::core_version()
        )),
        Commands::Diagram { pattern, units } => {
            let leaves = parse_pattern(&pattern)?;
            info!(
                "event=cli_diagram module=cli status=start leaves={} units={units}",
                leaves.len()
            );
            if units {
                ensure_even_bifolia(leaves.iter().map(|leaf| leaf.single))
                    .map_err(|err| err.to_string())?;
                to_json(&build_units(&leaves))
            } else {
                let slots = build_filled_diagram(&leaves).map_err(|err| err.to_string())?;
                to_json(&slots)
            }
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("failed to encode output: {err}"))
}

/// Parses `p,s,p:3r` into leaves at positions `1..`.
///
/// Unlabelled leaves take their position as folio label.
fn parse_pattern(pattern: &str) -> Result<Vec<Leaf>, String> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    trimmed
        .split(',')
        .zip(1u32..)
        .map(|(token, position)| parse_token(token.trim(), position))
        .collect()
}

fn parse_token(token: &str, position: u32) -> Result<Leaf, String> {
    let (kind, label) = match token.split_once(':') {
        Some((kind, label)) => (kind.trim(), Some(label.trim().to_string())),
        None => (token, None),
    };
    let single = match kind.to_ascii_lowercase().as_str() {
        "p" => false,
        "s" => true,
        _ => {
            return Err(format!(
                "invalid leaf `{token}` at position {position}; expected `p` or `s`"
            ))
        }
    };
    let label = label
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| position.to_string());
    Ok(Leaf::new(position, Some(label), single))
}
