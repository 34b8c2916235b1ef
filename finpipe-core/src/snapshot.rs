//! Raw snapshot persistence.
//!
//! Each run captures the full fetched record set before any transformation:
//! a full table (one column per field) and a simplified table (record dump +
//! extraction timestamp) that the load stage reads back. Files are keyed by
//! date range and replaced whole on every run, never appended.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::info;

use crate::record::TransactionRecord;

pub const SIMPLIFIED_PREFIX: &str = "simplified_transactions_";

/// A single run's captured record set, stamped once for the whole run.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub records: Vec<TransactionRecord>,
    pub extracted_at: DateTime<Utc>,
}

impl RawSnapshot {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            extracted_at: Utc::now(),
        }
    }

    /// Write both artifacts under `dir`, named by the fetch date range.
    /// Returns the path of the full artifact.
    pub fn write(&self, dir: &Path, start: NaiveDate, end: NaiveDate) -> Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let stem = format!(
            "transactions_{}_{}.csv",
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        );
        let full_path = dir.join(&stem);
        let simplified_path = dir.join(format!("simplified_{stem}"));

        self.write_full(&full_path)?;
        self.write_simplified(&simplified_path)?;

        info!(
            records = self.records.len(),
            full = %full_path.display(),
            simplified = %simplified_path.display(),
            "snapshot written"
        );
        Ok(full_path)
    }

    // One row per transaction, one column per field plus extracted_at. Extra
    // keys differ per record, so the header is the union across the batch.
    fn write_full(&self, path: &Path) -> Result<()> {
        let extra_keys: BTreeSet<&str> = self
            .records
            .iter()
            .flat_map(|r| r.extra.keys().map(String::as_str))
            .collect();

        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;

        let mut header = vec![
            "transaction_id",
            "account_id",
            "amount",
            "date",
            "name",
            "category",
            "pending",
        ];
        header.extend(extra_keys.iter().copied());
        header.push("extracted_at");
        wtr.write_record(&header)?;

        let stamp = self.extracted_at.to_rfc3339();
        for record in &self.records {
            let mut row = vec![
                record.transaction_id.clone(),
                record.account_id.clone(),
                record.amount.to_string(),
                record.date.to_string(),
                record.name.clone(),
                record.category.join(", "),
                record.pending.to_string(),
            ];
            for key in &extra_keys {
                row.push(match record.extra.get(*key) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                });
            }
            row.push(stamp.clone());
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_simplified(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        wtr.write_record(["transaction_data", "extracted_at"])?;

        let stamp = self.extracted_at.to_rfc3339();
        for record in &self.records {
            wtr.write_record([record.dump(), stamp.clone()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Most recent simplified artifact under `dir`, by filename sort (the range
/// suffix is `YYYYMMDD_YYYYMMDD`, so lexicographic order is date order).
pub fn latest_simplified(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(SIMPLIFIED_PREFIX) && n.ends_with(".csv"))
        })
        .collect();

    candidates.sort();
    match candidates.pop() {
        Some(path) => Ok(path),
        None => bail!("no snapshot files found in {}", dir.display()),
    }
}

/// Read a simplified artifact back as (record dump, extracted_at) pairs.
pub fn read_simplified(path: &Path) -> Result<Vec<(String, String)>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let data = record.get(0).unwrap_or("").to_string();
        let extracted_at = record.get(1).unwrap_or("").to_string();
        rows.push((data, extracted_at));
    }
    Ok(rows)
}
