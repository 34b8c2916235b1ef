//! Environment-driven configuration.
//!
//! Credentials and destination settings come from the environment (optionally
//! via a `.env` file, loaded once in `main`). A missing required variable is a
//! fatal precondition for the stage that needs it, surfaced before any network
//! or database work.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_DATA_DIR: &str = "data/raw";
pub const DEFAULT_TABLE: &str = "raw_transactions";

#[derive(Debug, Clone)]
pub struct PlaidConfig {
    pub base_url: String,
    pub client_id: String,
    pub secret: String,
}

impl PlaidConfig {
    /// Reads `PLAID_CLIENT_ID`, `PLAID_SECRET` and optional `PLAID_ENV`
    /// (default: sandbox).
    pub fn from_env() -> Result<Self> {
        let env_name = env::var("PLAID_ENV").unwrap_or_else(|_| "sandbox".to_string());
        Ok(Self {
            base_url: base_url_for(&env_name),
            client_id: required("PLAID_CLIENT_ID")?,
            secret: required("PLAID_SECRET")?,
        })
    }
}

/// Map an environment name to its API host. Anything unrecognized is taken as
/// a full base URL, which is how tests point the client at a local server.
pub fn base_url_for(env_name: &str) -> String {
    match env_name {
        "sandbox" => "https://sandbox.plaid.com".to_string(),
        "development" => "https://development.plaid.com".to_string(),
        "production" => "https://production.plaid.com".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Path to the destination database file.
    pub database: PathBuf,
    pub table: String,
}

impl WarehouseConfig {
    /// Reads `WAREHOUSE_DATABASE` and optional `WAREHOUSE_TABLE`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database: PathBuf::from(required("WAREHOUSE_DATABASE")?),
            table: env::var("WAREHOUSE_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
        })
    }
}

/// Snapshot output directory (`FINPIPE_DATA_DIR`, default `data/raw`).
pub fn data_dir() -> PathBuf {
    env::var("FINPIPE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("required environment variable {name} is not set"))
}
