//! # flowtimer
//!
//! Reconstructs transaction start and end times from Kentik top-talker
//! traffic series, fetched query window by query window
//!
//! ## Key Components
//! - [`run`] - The fetch/accumulate/export pipeline
//! - [`resolve_range`] - Pick the query range from the CLI or the template

mod api_client;
mod cli;
mod errors;
mod export;
mod pacing;
mod query_builder;
mod session_builder;
mod window_planner;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use std::time::Instant;
use tokio::time::sleep;

use crate::api_client::ApiClient;
use crate::cli::{Args, parse_cli_time};
use crate::export::{rank_records, render_csv};
use crate::pacing::{MIN_CALL_INTERVAL, PacingPolicy, RATE_LIMIT_BURST};
use crate::query_builder::QueryTemplate;
use crate::session_builder::SessionAccumulator;
use crate::window_planner::{MAX_WINDOW_SECS, plan_windows};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger based on debug flag
    if args.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    }

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let template = QueryTemplate::from_file(&args.input_file)?;
    let (range_start, range_end) = resolve_range(&args, &template)?;

    let windows = plan_windows(range_start, range_end, MAX_WINDOW_SECS)?;
    debug!(
        "Planned {} windows for range [{}, {})",
        windows.len(),
        range_start,
        range_end
    );

    let client = ApiClient::new(
        args.api_url.clone(),
        args.email.clone(),
        args.api_token.clone(),
    )?;
    let mut accumulator = SessionAccumulator::new(args.max_idle_time);
    let mut pacing = PacingPolicy::new(RATE_LIMIT_BURST, MIN_CALL_INTERVAL);

    for (call_number, window) in windows.iter().enumerate() {
        let body = template
            .materialize(window)
            .context("Failed to materialize query for window")?;

        if let Some(delay) = pacing.delay_before_call(Instant::now()) {
            debug!("Pacing: waiting {:?} before next call", delay);
            sleep(delay).await;
        }
        pacing.record_call(Instant::now());

        println!("Performing api call {} of {}.", call_number + 1, windows.len());
        let response = client.fetch_window(body).await?;
        accumulator.ingest_response(&response);
    }

    let records = accumulator.finalize(range_end);
    debug!("Accumulated {} session records", records.len());

    println!("Exporting data to {}.", args.output_file.display());
    let records = rank_records(records, args.sort);
    let output = render_csv(&records)?;
    std::fs::write(&args.output_file, output)
        .with_context(|| format!("Failed to write {}", args.output_file.display()))?;

    Ok(())
}

fn resolve_range(args: &Args, template: &QueryTemplate) -> Result<(i64, i64)> {
    match (&args.start_time, &args.end_time) {
        (Some(start), Some(end)) => Ok((parse_cli_time(start)?, parse_cli_time(end)?)),
        _ => template
            .embedded_range()
            .context("No --start-time/--end-time given and the query template has no usable range"),
    }
}
