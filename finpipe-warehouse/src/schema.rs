//! Destination schema discovery.
//!
//! The target table's column list is introspected at load time, never
//! hard-coded: the materializer adapts to whatever columns currently exist.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;

/// Column names of `table`, in the table's declared order.
///
/// The table name comes from trusted configuration; PRAGMA arguments cannot be
/// bound as parameters.
pub fn discover_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("describing table {table}"))?;

    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<_, _>>()?;

    if columns.is_empty() {
        bail!("destination table {table} does not exist");
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_in_declared_order() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE raw_transactions (
                transaction_id TEXT,
                amount REAL,
                date TEXT,
                name TEXT,
                category TEXT,
                pending INTEGER,
                extracted_at TEXT
            )",
        )
        .unwrap();

        let columns = discover_columns(&conn, "raw_transactions").unwrap();
        assert_eq!(
            columns,
            vec![
                "transaction_id",
                "amount",
                "date",
                "name",
                "category",
                "pending",
                "extracted_at"
            ]
        );
    }

    #[test]
    fn test_missing_table_errors() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(discover_columns(&conn, "nope").is_err());
    }
}
