//! Paginated retrieval with bounded retry.
//!
//! Per page: up to `max_retries` attempts, sleeping `retry_delay` between
//! attempts while the upstream reports not-ready. Any other error aborts the
//! whole fetch. Between successful pages a short pause keeps the request rate
//! polite.

use std::time::Duration;

use tracing::{info, warn};

use finpipe_core::TransactionRecord;

use crate::error::FetchError;

/// One bounded chunk of the result set plus the server-reported total.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionRecord>,
    pub total: usize,
}

/// Seam between the pagination loop and the wire client, so the loop is
/// testable without a server.
pub trait TransactionSource {
    fn fetch_page(&mut self, offset: usize, count: usize) -> Result<TransactionPage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub page_size: usize,
    /// Maximum attempts per page, counting the first.
    pub max_retries: usize,
    pub retry_delay: Duration,
    /// Pause between successful pages.
    pub page_pause: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 500,
            max_retries: 5,
            retry_delay: Duration::from_secs(30),
            page_pause: Duration::from_secs(1),
        }
    }
}

/// Retrieve the full ordered result set. An empty range yields an empty Vec,
/// not an error.
pub fn fetch_all(
    source: &mut impl TransactionSource,
    opts: &FetchOptions,
) -> Result<Vec<TransactionRecord>, FetchError> {
    let mut all: Vec<TransactionRecord> = Vec::new();

    loop {
        let offset = all.len();
        let page = fetch_page_with_retry(source, offset, opts)?;

        let received = page.transactions.len();
        info!(
            received,
            offset,
            total = page.total,
            "retrieved transaction page"
        );
        all.extend(page.transactions);

        if received == 0 || all.len() >= page.total {
            break;
        }
        std::thread::sleep(opts.page_pause);
    }

    info!(total = all.len(), "fetch complete");
    Ok(all)
}

fn fetch_page_with_retry(
    source: &mut impl TransactionSource,
    offset: usize,
    opts: &FetchOptions,
) -> Result<TransactionPage, FetchError> {
    let mut attempt = 0;
    loop {
        match source.fetch_page(offset, opts.page_size) {
            Ok(page) => return Ok(page),
            Err(FetchError::NotReady) => {
                attempt += 1;
                if attempt >= opts.max_retries {
                    warn!(attempts = attempt, "retries exhausted, data still not ready");
                    return Err(FetchError::NotReady);
                }
                warn!(
                    attempt,
                    max = opts.max_retries,
                    delay_secs = opts.retry_delay.as_secs(),
                    "data not ready, retrying"
                );
                std::thread::sleep(opts.retry_delay);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: usize) -> TransactionRecord {
        serde_json::from_value(json!({
            "transaction_id": format!("txn-{id:04}"),
            "account_id": "acc-1",
            "amount": 1.25,
            "date": "2023-04-07",
            "name": "Coffee",
            "category": ["Food"],
            "pending": false
        }))
        .unwrap()
    }

    fn page(ids: std::ops::Range<usize>, total: usize) -> TransactionPage {
        TransactionPage {
            transactions: ids.map(record).collect(),
            total,
        }
    }

    /// Feeds a fixed script of responses and records the offsets requested.
    struct ScriptedSource {
        script: Vec<Result<TransactionPage, FetchError>>,
        offsets: Vec<usize>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<TransactionPage, FetchError>>) -> Self {
            Self {
                script,
                offsets: Vec::new(),
            }
        }
    }

    impl TransactionSource for ScriptedSource {
        fn fetch_page(
            &mut self,
            offset: usize,
            _count: usize,
        ) -> Result<TransactionPage, FetchError> {
            self.offsets.push(offset);
            self.script.remove(0)
        }
    }

    fn fast_opts() -> FetchOptions {
        FetchOptions {
            retry_delay: Duration::ZERO,
            page_pause: Duration::ZERO,
            ..FetchOptions::default()
        }
    }

    #[test]
    fn test_three_pages_of_500() {
        let mut source = ScriptedSource::new(vec![
            Ok(page(0..500, 1200)),
            Ok(page(500..1000, 1200)),
            Ok(page(1000..1200, 1200)),
        ]);

        let records = fetch_all(&mut source, &fast_opts()).unwrap();

        assert_eq!(source.offsets, vec![0, 500, 1000]);
        assert_eq!(records.len(), 1200);
        // Original order is preserved across pages.
        assert_eq!(records[0].transaction_id, "txn-0000");
        assert_eq!(records[1199].transaction_id, "txn-1199");
    }

    #[test]
    fn test_empty_range_is_not_an_error() {
        let mut source = ScriptedSource::new(vec![Ok(page(0..0, 0))]);
        let records = fetch_all(&mut source, &fast_opts()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_zero_record_page_terminates() {
        // Server claims more than it delivers; the empty page breaks the loop.
        let mut source = ScriptedSource::new(vec![Ok(page(0..10, 50)), Ok(page(0..0, 50))]);
        let records = fetch_all(&mut source, &fast_opts()).unwrap();
        assert_eq!(records.len(), 10);
    }

    #[test]
    fn test_not_ready_four_times_then_success() {
        let mut source = ScriptedSource::new(vec![
            Err(FetchError::NotReady),
            Err(FetchError::NotReady),
            Err(FetchError::NotReady),
            Err(FetchError::NotReady),
            Ok(page(0..10, 10)),
        ]);

        let records = fetch_all(&mut source, &fast_opts()).unwrap();

        assert_eq!(records.len(), 10);
        // Every retry re-requests the same offset: no duplicates possible.
        assert_eq!(source.offsets, vec![0; 5]);
        assert_eq!(records[3].transaction_id, "txn-0003");
    }

    #[test]
    fn test_retries_exhausted_fails_whole_fetch() {
        let mut source = ScriptedSource::new(vec![
            Err(FetchError::NotReady),
            Err(FetchError::NotReady),
            Err(FetchError::NotReady),
            Err(FetchError::NotReady),
            Err(FetchError::NotReady),
            Err(FetchError::NotReady),
        ]);

        let result = fetch_all(&mut source, &fast_opts());

        assert!(matches!(result, Err(FetchError::NotReady)));
        // Default budget is 5 attempts; the 6th not-ready is never requested.
        assert_eq!(source.offsets.len(), 5);
    }

    #[test]
    fn test_fatal_error_aborts_immediately() {
        let mut source = ScriptedSource::new(vec![
            Ok(page(0..500, 1000)),
            Err(FetchError::Api {
                code: "INVALID_ACCESS_TOKEN".into(),
                message: "token revoked".into(),
            }),
        ]);

        let result = fetch_all(&mut source, &fast_opts());

        assert!(matches!(result, Err(FetchError::Api { .. })));
        assert_eq!(source.offsets, vec![0, 500]);
    }

    #[test]
    fn test_retry_preserved_after_successful_page() {
        // Retry budget resets per page.
        let mut source = ScriptedSource::new(vec![
            Err(FetchError::NotReady),
            Ok(page(0..500, 600)),
            Err(FetchError::NotReady),
            Ok(page(500..600, 600)),
        ]);

        let records = fetch_all(&mut source, &fast_opts()).unwrap();
        assert_eq!(records.len(), 600);
        assert_eq!(source.offsets, vec![0, 0, 500, 500]);
    }
}
