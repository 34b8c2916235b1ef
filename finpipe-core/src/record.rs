//! Transaction record model.
//!
//! Records deserialize straight from the aggregation API's JSON. Provider
//! fields we do not model explicitly are kept in `extra` so nothing retrieved
//! is dropped before the snapshot is written.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One external financial transaction, immutable once retrieved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub account_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    /// Merchant / counterparty name.
    pub name: String,
    /// Ordered category path, broadest first (e.g. Food -> Coffee Shop).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: Vec<String>,
    #[serde(default)]
    pub pending: bool,
    /// Provider-specific attributes not modeled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// The API sends `category: null` for uncategorized transactions.
fn null_as_empty<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

impl TransactionRecord {
    /// Render the record as a loosely-structured textual mapping:
    /// `'key': value,` pairs with `None`/`True`/`False` literals, single-quoted
    /// strings, bracketed quoted lists and `date(Y, M, D)` constructors.
    ///
    /// This is the `transaction_data` blob of the simplified snapshot artifact,
    /// and the form [`crate::reconstruct::reconstruct`] parses at load time.
    pub fn dump(&self) -> String {
        let mut out = String::from("{");
        push_pair(&mut out, "transaction_id", &quote(&self.transaction_id));
        push_pair(&mut out, "account_id", &quote(&self.account_id));
        push_pair(&mut out, "amount", &dump_float(self.amount));
        push_pair(&mut out, "date", &dump_date(&self.date));
        push_pair(&mut out, "name", &quote(&self.name));
        push_pair(&mut out, "category", &dump_list(&self.category));
        push_pair(&mut out, "pending", if self.pending { "True" } else { "False" });
        for (key, value) in &self.extra {
            push_pair(&mut out, key, &dump_json(value));
        }
        out.push('}');
        out
    }
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    out.push('\'');
    out.push_str(key);
    out.push_str("': ");
    out.push_str(value);
    out.push_str(", ");
}

fn quote(s: &str) -> String {
    format!("'{s}'")
}

// Whole floats keep one decimal so the reconstructor reads them back as floats.
fn dump_float(x: f64) -> String {
    if x == x.trunc() {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

fn dump_date(d: &NaiveDate) -> String {
    use chrono::Datelike;
    format!("date({}, {}, {})", d.year(), d.month(), d.day())
}

fn dump_list(items: &[String]) -> String {
    if items.is_empty() {
        return "None".to_string();
    }
    let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
    format!("[{}]", quoted.join(", "))
}

fn dump_json(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let strings: Vec<String> = items
                .iter()
                .map(|v| match v {
                    Value::String(s) => quote(s),
                    other => other.to_string(),
                })
                .collect();
            format!("[{}]", strings.join(", "))
        }
        // Nested objects are out of contract; keep them verbatim as JSON text.
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TransactionRecord {
        serde_json::from_value(json!({
            "transaction_id": "txn-001",
            "account_id": "acc-9",
            "amount": 4.33,
            "date": "2023-04-07",
            "name": "Starbucks",
            "category": ["Food and Drink", "Coffee Shop"],
            "pending": false,
            "iso_currency_code": "USD",
            "merchant_name": null
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_from_api_json() {
        let r = sample();
        assert_eq!(r.transaction_id, "txn-001");
        assert_eq!(r.amount, 4.33);
        assert_eq!(r.category, vec!["Food and Drink", "Coffee Shop"]);
        assert!(!r.pending);
        assert_eq!(r.extra["iso_currency_code"], json!("USD"));
    }

    #[test]
    fn test_null_category_becomes_empty() {
        let r: TransactionRecord = serde_json::from_value(json!({
            "transaction_id": "t",
            "account_id": "a",
            "amount": 1.0,
            "date": "2024-01-02",
            "name": "X",
            "category": null
        }))
        .unwrap();
        assert!(r.category.is_empty());
    }

    #[test]
    fn test_dump_shapes() {
        let text = sample().dump();
        assert!(text.contains("'transaction_id': 'txn-001', "));
        assert!(text.contains("'amount': 4.33, "));
        assert!(text.contains("'date': date(2023, 4, 7), "));
        assert!(text.contains("'category': ['Food and Drink', 'Coffee Shop'], "));
        assert!(text.contains("'pending': False, "));
        assert!(text.contains("'merchant_name': None, "));
    }

    #[test]
    fn test_dump_whole_amount_keeps_decimal() {
        let mut r = sample();
        r.amount = 12.0;
        assert!(r.dump().contains("'amount': 12.0, "));
    }
}
