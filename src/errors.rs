//! # Errors Module
//!
//! Failure modes that abort a flowtimer run
//!
//! ## Key Components
//! - [`FlowError`] - Fatal errors from planning, fetching, accumulating and exporting

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid time range: end {end} is not after start {start}")]
    InvalidRange { start: i64, end: i64 },
    #[error("malformed api response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("session record for key '{key}' was never closed")]
    UnclosedRecord { key: String },
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http status {status}: {body}")]
    TransportStatus { status: u16, body: String },
}
