//! Run coordinator.
//!
//! Each stage catches its errors at this boundary and reports a plain boolean
//! to the external scheduler, which owns retry-across-runs policy. Nothing
//! here panics past `main` or leaks a raw error upward.

use anyhow::{Context, Result};
use chrono::{Days, Local};
use tracing::{error, info};

use finpipe_core::{RawSnapshot, latest_simplified, read_simplified};
use finpipe_ingest::{FetchOptions, PlaidClient, PlaidSource, fetch_all};
use finpipe_warehouse::load_snapshot;

use crate::config::{self, PlaidConfig, WarehouseConfig};

/// Trailing fetch window: two years, like the upstream sandbox seed range.
const LOOKBACK_DAYS: u64 = 730;

/// Extract stage: token -> paginated fetch -> snapshot artifacts.
pub fn run_extract() -> bool {
    match extract() {
        Ok(0) => {
            error!("no transactions found in the date range, nothing written");
            false
        }
        Ok(n) => {
            println!("Extraction complete: {n} transactions captured.");
            true
        }
        Err(e) => {
            error!("extraction failed: {e:#}");
            false
        }
    }
}

/// Load stage: latest snapshot -> materialize -> destination table.
pub fn run_load() -> bool {
    match load() {
        Ok(n) => {
            println!("Load complete: {n} rows inserted.");
            true
        }
        Err(e) => {
            error!("load failed: {e:#}");
            false
        }
    }
}

/// Extract then load; a failed extract stops the run.
pub fn run_pipeline() -> bool {
    run_extract() && run_load()
}

fn extract() -> Result<usize> {
    let cfg = PlaidConfig::from_env().context("aggregation API credentials")?;
    let client = PlaidClient::new(&cfg.base_url, &cfg.client_id, &cfg.secret)?;

    let access_token = client
        .sandbox_access_token()
        .context("obtaining access token")?;

    let end = Local::now().date_naive();
    let start = end
        .checked_sub_days(Days::new(LOOKBACK_DAYS))
        .context("computing fetch window")?;
    info!(%start, %end, "requesting transactions");

    let mut source = PlaidSource::new(&client, &access_token, start, end);
    let records = fetch_all(&mut source, &FetchOptions::default()).context("fetching transactions")?;
    if records.is_empty() {
        return Ok(0);
    }

    let snapshot = RawSnapshot::new(records);
    snapshot.write(&config::data_dir(), start, end)?;
    Ok(snapshot.records.len())
}

fn load() -> Result<usize> {
    let cfg = WarehouseConfig::from_env().context("warehouse configuration")?;

    let latest = latest_simplified(&config::data_dir())?;
    println!("Loading file: {}", latest.display());

    let entries = read_simplified(&latest)?;
    load_snapshot(&cfg.database, &cfg.table, &entries)
}
