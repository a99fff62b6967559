//! CLI command implementations.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

pub mod generate;
pub mod profile;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing JSON output")?;
    println!("{text}");
    Ok(())
}
