//! # CLI Module
//!
//! Command-line interface definitions and argument parsing for flowtimer
//!
//! ## Key Components
//! - [`Args`] - Main CLI arguments structure
//! - [`SortField`] - Export ordering options
//! - [`parse_cli_time`] - Parse the YYYY:MM:DD:HH:mm time grammar

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.kentik.com/api/v5/query/topxdata";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortField {
    Key,
    Start,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Reconstructs transaction start/end times from Kentik top-talker data"
)]
pub struct Args {
    /// Name of output file
    pub output_file: PathBuf,

    /// Kentik user email
    #[arg(short, long)]
    pub email: String,

    /// API token for user
    #[arg(short, long)]
    pub api_token: String,

    /// Data Explorer query JSON used as the request template
    #[arg(short, long, default_value = "input.json")]
    pub input_file: PathBuf,

    /// Start time for the query (YYYY:MM:DD:HH:mm), defaults to the template's range
    #[arg(long, requires = "end_time")]
    pub start_time: Option<String>,

    /// End time for the query (YYYY:MM:DD:HH:mm), defaults to the template's range
    #[arg(long, requires = "start_time")]
    pub end_time: Option<String>,

    /// Maximum idle time per transfer, in seconds
    #[arg(long, default_value = "60")]
    pub max_idle_time: i64,

    /// What to sort output by
    #[arg(long, default_value = "start", value_enum)]
    pub sort: SortField,

    /// Kentik topxdata endpoint
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Parse a YYYY:MM:DD:HH:mm timestamp as local time, returning epoch seconds.
pub fn parse_cli_time(text: &str) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(text, "%Y:%m:%d:%H:%M")
        .with_context(|| format!("Invalid time '{}', expected YYYY:MM:DD:HH:mm", text))?;
    let local = Local
        .from_local_datetime(&naive)
        .single()
        .with_context(|| format!("Time '{}' is ambiguous in the local timezone", text))?;
    Ok(local.timestamp())
}
