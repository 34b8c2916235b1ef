//! finpipe-ingest: aggregation-API client and the paginated transaction
//! fetcher with bounded retry.

pub mod client;
pub mod error;
pub mod fetcher;

pub use client::{PlaidClient, PlaidSource};
pub use error::FetchError;
pub use fetcher::{FetchOptions, TransactionPage, TransactionSource, fetch_all};
