//! HTTP client abstraction for provider integrations
//!
//! Upstream lookups go through the `HttpClient` trait rather than `reqwest`
//! directly, so the YouTube client can be exercised against canned responses
//! in tests without any network access.
//!
//! # Example Usage:
//! ``
//! use crate::http::{HttpClient, DefaultHttpClient};
//!
//! // In production code
//! let http: Arc<dyn HttpClient> = Arc::new(DefaultHttpClient::new(Duration::from_secs(8))?);
//!
//! // In tests
//! let http: Arc<dyn HttpClient> = Arc::new(MockHttpClient::new());
//! ``

use std::time::Duration;

use async_trait::async_trait;
use reqwest;
use tracing::debug;
use url::Url;

use crate::Error;

/// Longest slice of an error body we keep in an error message.
const ERROR_BODY_LIMIT: usize = 300;

/// A generic trait for making HTTP requests.
///
/// Implementations turn transport failures, timeouts and non-2xx answers into
/// `Error::UpstreamUnavailable`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: Url) -> Result<String, Error>;
}

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    /// Every request made through this client gives up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn get(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}{}", url.host_str().unwrap_or_default(), url.path());

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::UpstreamUnavailable(format!("request timed out: {}", e))
            } else {
                Error::UpstreamUnavailable(format!("network error: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(ERROR_BODY_LIMIT)
                .collect();
            return Err(Error::UpstreamUnavailable(format!("HTTP {} => {}", status, body)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("failed reading body: {}", e)))
    }
}
