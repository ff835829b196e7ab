//! # Query Builder Module
//!
//! Loads a Data Explorer query template and materializes it per window
//!
//! ## Key Components
//! - [`QueryTemplate`] - A raw topxdata query body with the breadth cap applied
//! - [`QueryTemplate::materialize`] - Substitute one window's bounds into the body
//! - [`QueryTemplate::embedded_range`] - Recover the time range the template itself carries

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use crate::window_planner::TimeWindow;

/// Breadth cap forced onto every query, the topxdata maximum.
pub const TOP_TALKER_LIMIT: u32 = 350;

lazy_static! {
    static ref DEPTH_RE: Regex = Regex::new(r#""depth":\s*\d+"#).unwrap();
    static ref TOPX_RE: Regex = Regex::new(r#""topx":\s*\d+"#).unwrap();
    static ref STARTING_TIME_RE: Regex = Regex::new(r#""starting_time":\s*"[^"]*""#).unwrap();
    static ref ENDING_TIME_RE: Regex = Regex::new(r#""ending_time":\s*"[^"]*""#).unwrap();
    static ref LOOKBACK_RE: Regex = Regex::new(r#""from_to_lookback":\s*\d+"#).unwrap();
}

/// A Data Explorer query body, reused for every window of the range.
pub struct QueryTemplate {
    raw: String,
}

impl QueryTemplate {
    /// Wrap a raw query body, forcing depth and topx up to the API maximum.
    pub fn new(raw: String) -> Self {
        let capped = DEPTH_RE
            .replace_all(&raw, format!(r#""depth": {}"#, TOP_TALKER_LIMIT).as_str())
            .into_owned();
        let capped = TOPX_RE
            .replace_all(&capped, format!(r#""topx": {}"#, TOP_TALKER_LIMIT).as_str())
            .into_owned();
        Self { raw: capped }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query template {}", path.display()))?;
        Ok(Self::new(raw))
    }

    /// Produce the query body for one window, bounds at minute precision in local time.
    pub fn materialize(&self, window: &TimeWindow) -> Result<String> {
        let start_text = format_query_time(window.start)?;
        let end_text = format_query_time(window.end)?;

        let body = STARTING_TIME_RE
            .replace_all(
                &self.raw,
                format!(r#""starting_time": "{}""#, start_text).as_str(),
            )
            .into_owned();
        let body = ENDING_TIME_RE
            .replace_all(
                &body,
                format!(r#""ending_time": "{}""#, end_text).as_str(),
            )
            .into_owned();
        let body = LOOKBACK_RE
            .replace_all(
                &body,
                format!(r#""from_to_lookback": {}"#, window.duration_secs()).as_str(),
            )
            .into_owned();

        Ok(body)
    }

    /// Read the global range embedded in the template, as epoch seconds.
    pub fn embedded_range(&self) -> Result<(i64, i64)> {
        let value: serde_json::Value =
            serde_json::from_str(&self.raw).context("Failed to parse query template as JSON")?;
        let query = value
            .pointer("/queries/0/query")
            .context("Query template has no queries[0].query object")?;

        let start_text = query
            .get("starting_time")
            .and_then(|v| v.as_str())
            .context("Query template has no starting_time")?;
        let end_text = query
            .get("ending_time")
            .and_then(|v| v.as_str())
            .context("Query template has no ending_time")?;

        Ok((parse_query_time(start_text)?, parse_query_time(end_text)?))
    }
}

fn format_query_time(epoch_secs: i64) -> Result<String> {
    let time = Local
        .timestamp_opt(epoch_secs, 0)
        .single()
        .with_context(|| format!("Timestamp {} is not representable", epoch_secs))?;
    Ok(time.format("%Y-%m-%d %H:%M").to_string())
}

fn parse_query_time(text: &str) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
        .with_context(|| format!("Invalid query time '{}', expected YYYY-MM-DD HH:MM", text))?;
    let local = Local
        .from_local_datetime(&naive)
        .single()
        .with_context(|| format!("Query time '{}' is ambiguous in the local timezone", text))?;
    Ok(local.timestamp())
}
