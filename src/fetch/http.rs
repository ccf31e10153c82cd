use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::FetchConfig;
use crate::error::FetchError;

use super::{html, Fetcher};

/// Fetches the listing page over HTTP and extracts its entry blocks.
#[derive(Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
  url: Url,
  container_class: String,
}

impl HttpFetcher {
  pub fn new(url: Url, config: &FetchConfig) -> Result<Self, FetchError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(config.user_agent.as_str())
      .build()?;

    Ok(Self {
      client,
      url,
      container_class: config.container_class.clone(),
    })
  }
}

impl Fetcher for HttpFetcher {
  async fn fetch(&mut self) -> Result<Vec<String>, FetchError> {
    let body = self
      .client
      .get(self.url.clone())
      .send()
      .await?
      .error_for_status()?
      .text()
      .await?;
    debug!(url = %self.url, bytes = body.len(), "fetched listing page");

    html::extract_blocks(&body, &self.container_class).ok_or_else(|| {
      FetchError::ListingNotFound {
        container: self.container_class.clone(),
      }
    })
  }
}
