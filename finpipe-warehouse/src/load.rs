//! Bulk row insertion into the destination table.
//!
//! Inserts are parameterized and row-independent: a rejected row is logged and
//! skipped, the batch continues, and whatever was inserted before a failure
//! stays committed. There is no cross-batch transaction.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use rusqlite::types::Value as SqlValue;
use tracing::{info, warn};

use finpipe_core::FieldValue;

use crate::materialize::materialize_row;
use crate::schema::discover_columns;

fn to_sql(value: &FieldValue) -> SqlValue {
    match value {
        FieldValue::Null => SqlValue::Null,
        FieldValue::Int(n) => SqlValue::Integer(*n),
        FieldValue::Float(x) => SqlValue::Real(*x),
        FieldValue::Bool(b) => SqlValue::Integer(i64::from(*b)),
        FieldValue::Text(s) => SqlValue::Text(s.clone()),
    }
}

/// Insert `rows` into `table`, one statement per row. Returns how many rows
/// were accepted; rejected rows are skipped, not fatal.
pub fn load_rows(
    conn: &Connection,
    table: &str,
    columns: &[String],
    rows: &[Vec<FieldValue>],
) -> Result<usize> {
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    );
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("preparing insert into {table}"))?;

    let mut inserted = 0;
    for row in rows {
        let params = rusqlite::params_from_iter(row.iter().map(to_sql));
        match stmt.execute(params) {
            Ok(_) => inserted += 1,
            Err(e) => {
                warn!(error = %e, "skipping rejected row");
            }
        }
    }
    Ok(inserted)
}

/// Load a simplified snapshot into the destination: open the connection,
/// discover the live schema, materialize each (record dump, extracted_at)
/// entry against it and insert. The connection is dropped on every exit path.
pub fn load_snapshot(db: &Path, table: &str, entries: &[(String, String)]) -> Result<usize> {
    let conn =
        Connection::open(db).with_context(|| format!("opening warehouse {}", db.display()))?;

    let columns = discover_columns(&conn, table)?;
    info!(table, columns = columns.len(), "discovered destination schema");

    let rows: Vec<Vec<FieldValue>> = entries
        .iter()
        .map(|(text, extracted_at)| materialize_row(&columns, text, extracted_at))
        .collect();

    let inserted = load_rows(&conn, table, &columns, &rows)?;
    info!(inserted, attempted = rows.len(), "load complete");
    Ok(inserted)
}
