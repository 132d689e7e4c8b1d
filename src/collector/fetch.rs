use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};

/// Transport seam for the collector: production uses HTTP, tests substitute
/// canned payloads.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetches response bodies over HTTP GET.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::message(format!("Failed to fetch data from API: {e}")))?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
