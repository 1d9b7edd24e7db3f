use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

/// Source of raw page HTML. Any error counts as a failed fetch.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher with a fixed timeout and a pause after every successful request.
pub struct HttpFetcher {
    client: reqwest::Client,
    delay: Duration,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration, delay: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, delay })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        info!("Fetching: {}", url);
        let html = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("Failed to fetch {}", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        // Be polite to the remote site before the next request goes out.
        tokio::time::sleep(self.delay).await;
        Ok(html)
    }
}
