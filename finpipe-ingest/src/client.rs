//! Blocking client for the transaction aggregation API (Plaid wire shapes).
//!
//! Credentials ride in every request body, per the API's convention. TLS
//! verification stays on; the client uses reqwest's defaults.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use finpipe_core::TransactionRecord;

use crate::error::FetchError;
use crate::fetcher::{TransactionPage, TransactionSource};

/// Sandbox test institution (Chase) and credentials, as documented upstream.
const SANDBOX_INSTITUTION: &str = "ins_109508";
const SANDBOX_USERNAME: &str = "user_good";
const SANDBOX_PASSWORD: &str = "pass_good";

/// Sandbox items take a moment to materialize transactions after the token
/// exchange.
const SANDBOX_SETTLE: Duration = Duration::from_secs(5);

pub struct PlaidClient {
    http: reqwest::blocking::Client,
    base_url: String,
    client_id: String,
    secret: String,
}

#[derive(Debug, Deserialize)]
struct PublicTokenResponse {
    public_token: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    access_token: String,
    item_id: String,
}

#[derive(Debug, Deserialize)]
struct TransactionsGetResponse {
    transactions: Vec<TransactionRecord>,
    total_transactions: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: String,
    #[serde(default)]
    error_message: String,
}

impl PlaidClient {
    pub fn new(base_url: &str, client_id: &str, secret: &str) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            secret: secret.to_string(),
        })
    }

    /// Create a sandbox item against the test institution and exchange its
    /// public token for an access token.
    pub fn sandbox_access_token(&self) -> Result<String, FetchError> {
        let created: PublicTokenResponse = self.post(
            "/sandbox/public_token/create",
            json!({
                "client_id": self.client_id,
                "secret": self.secret,
                "institution_id": SANDBOX_INSTITUTION,
                "initial_products": ["transactions"],
                "options": {
                    "webhook": "https://www.example.com/webhook",
                    "override_username": SANDBOX_USERNAME,
                    "override_password": SANDBOX_PASSWORD,
                },
            }),
        )?;
        debug!("created sandbox public token");

        let exchanged: ExchangeResponse = self.post(
            "/item/public_token/exchange",
            json!({
                "client_id": self.client_id,
                "secret": self.secret,
                "public_token": created.public_token,
            }),
        )?;
        info!(item_id = %exchanged.item_id, "exchanged public token for access token");

        // Give the sandbox a moment to seed transactions for the new item.
        std::thread::sleep(SANDBOX_SETTLE);

        Ok(exchanged.access_token)
    }

    /// Fetch one page of transactions for the date range (inclusive).
    pub fn get_transactions(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
        count: usize,
        offset: usize,
    ) -> Result<TransactionPage, FetchError> {
        let response: TransactionsGetResponse = self.post(
            "/transactions/get",
            json!({
                "client_id": self.client_id,
                "secret": self.secret,
                "access_token": access_token,
                "start_date": start.to_string(),
                "end_date": end.to_string(),
                "options": { "count": count, "offset": offset },
            }),
        )?;
        Ok(TransactionPage {
            transactions: response.transactions,
            total: response.total_transactions,
        })
    }

    fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(&body).send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json()?);
        }

        // Non-2xx bodies carry a structured error; PRODUCT_NOT_READY is the
        // one transient case the fetcher retries.
        let text = response.text()?;
        match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(err) if err.error_code == "PRODUCT_NOT_READY" => Err(FetchError::NotReady),
            Ok(err) => Err(FetchError::Api {
                code: err.error_code,
                message: err.error_message,
            }),
            Err(_) => Err(FetchError::Api {
                code: status.to_string(),
                message: text,
            }),
        }
    }
}

/// Binds a client, access token and date range into a page source for
/// [`crate::fetcher::fetch_all`].
pub struct PlaidSource<'a> {
    client: &'a PlaidClient,
    access_token: &'a str,
    start: NaiveDate,
    end: NaiveDate,
}

impl<'a> PlaidSource<'a> {
    pub fn new(
        client: &'a PlaidClient,
        access_token: &'a str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            client,
            access_token,
            start,
            end,
        }
    }
}

impl TransactionSource for PlaidSource<'_> {
    fn fetch_page(&mut self, offset: usize, count: usize) -> Result<TransactionPage, FetchError> {
        self.client
            .get_transactions(self.access_token, self.start, self.end, count, offset)
    }
}
