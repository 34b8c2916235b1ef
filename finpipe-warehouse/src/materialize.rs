//! Row materialization: destination columns -> typed values.

use finpipe_core::{FieldValue, reconstruct_joined};

/// Column name carrying the snapshot-level extraction timestamp. It is copied
/// from snapshot metadata, never reconstructed from the record text.
pub const EXTRACTED_AT: &str = "extracted_at";

/// Build one destination row from a record dump.
///
/// The output always has exactly one value per schema column, in schema order;
/// a field absent from the source yields [`FieldValue::Null`], never a missing
/// slot. Column names are case-folded to the dump's lowercase keys.
pub fn materialize_row(columns: &[String], record_text: &str, extracted_at: &str) -> Vec<FieldValue> {
    columns
        .iter()
        .map(|column| {
            if column.eq_ignore_ascii_case(EXTRACTED_AT) {
                FieldValue::Text(extracted_at.to_string())
            } else {
                reconstruct_joined(record_text, &column.to_lowercase())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const RECORD: &str = "{'transaction_id': 'txn-001', 'amount': 12.5, \
        'name': 'Coffee', 'pending': False, 'date': datetime.date(2023, 4, 7), \
        'category': ['Food', 'Coffee Shop'], }";

    #[test]
    fn test_row_matches_schema_shape() {
        let columns = cols(&["TRANSACTION_ID", "AMOUNT", "DATE", "CATEGORY", "EXTRACTED_AT"]);
        let row = materialize_row(&columns, RECORD, "2023-04-07T12:00:00Z");

        assert_eq!(row.len(), columns.len());
        assert_eq!(row[0], FieldValue::Text("txn-001".into()));
        assert_eq!(row[1], FieldValue::Float(12.5));
        assert_eq!(row[2], FieldValue::Text("2023-04-07".into()));
        assert_eq!(row[3], FieldValue::Text("Food, Coffee Shop".into()));
        assert_eq!(row[4], FieldValue::Text("2023-04-07T12:00:00Z".into()));
    }

    #[test]
    fn test_missing_fields_fill_with_null() {
        let columns = cols(&["TRANSACTION_ID", "MERCHANT_CITY", "CHECK_NUMBER", "AMOUNT"]);
        let row = materialize_row(&columns, "{'transaction_id': 'x', }", "t");

        assert_eq!(row.len(), 4);
        assert_eq!(row[0], FieldValue::Text("x".into()));
        assert_eq!(row[1], FieldValue::Null);
        assert_eq!(row[2], FieldValue::Null);
        assert_eq!(row[3], FieldValue::Null);
    }

    #[test]
    fn test_extracted_at_never_reconstructed() {
        // Even if the dump happens to carry an extracted_at key, the
        // snapshot-level stamp wins.
        let columns = cols(&["extracted_at"]);
        let row = materialize_row(&columns, "{'extracted_at': 'bogus', }", "real-stamp");
        assert_eq!(row[0], FieldValue::Text("real-stamp".into()));
    }
}
