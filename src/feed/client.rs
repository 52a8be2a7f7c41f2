//! HTTP client for the wearer vitals feed.
//!
//! The feed service is an external collaborator: one read endpoint with
//! implicit "latest" semantics, polled at a fixed interval. Every failure
//! mode (transport, non-2xx, malformed payload) maps uniformly to a
//! failed poll; the controller degrades to last-known-good state.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::FeedSnapshot;

/// Error types for feed fetches
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Feed returned HTTP status {0}")]
    Status(u16),

    #[error("Malformed feed payload: {0}")]
    Decode(String),
}

/// Source of feed snapshots. The controller only ever sees this trait;
/// tests substitute scripted sources.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the latest vitals for all active wearers.
    async fn fetch_latest(&self) -> Result<FeedSnapshot, FeedError>;
}

/// Production source: GETs `<base>/api/vitals` as JSON.
pub struct HttpFeedSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFeedSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a caller-configured client (e.g. with an explicit timeout).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        let endpoint = format!("{}/api/vitals", base_url.trim_end_matches('/'));
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_latest(&self) -> Result<FeedSnapshot, FeedError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        response
            .json::<FeedSnapshot>()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))
    }
}
