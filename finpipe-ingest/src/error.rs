//! Fetch error taxonomy.
//!
//! The retry loop only ever retries [`FetchError::NotReady`]; everything else
//! aborts the whole fetch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The upstream has not finished preparing transaction data for the item
    /// yet (API error code `PRODUCT_NOT_READY`). Transient, bounded retry.
    #[error("transaction data not ready upstream")]
    NotReady,

    /// Any other upstream API error. Fatal for the fetch.
    #[error("upstream api error {code}: {message}")]
    Api { code: String, message: String },

    /// Transport-level failure. Fatal for the fetch.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::NotReady)
    }
}
