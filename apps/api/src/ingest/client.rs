//! HTTP seam for the listing providers.
//!
//! The batch only needs "GET this URL, give me JSON". Keeping that behind
//! `ListingClient` lets tests script provider responses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::StoreError;

const USER_AGENT: &str = concat!("jobboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait ListingClient: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// reqwest-backed client. No retries: a failed GET is reported once and
/// the provider is tried again on the next run.
#[derive(Clone)]
pub struct HttpListingClient {
    client: Client,
}

impl HttpListingClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ListingClient for HttpListingClient {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Listing provider returned {}: {}", status, body);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
