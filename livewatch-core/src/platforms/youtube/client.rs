// File: livewatch-core/src/platforms/youtube/client.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use url::Url;

use livewatch_common::models::{ChannelMetadata, VideoDetails};
use livewatch_common::traits::LiveUpstream;

use crate::config::UpstreamConfig;
use crate::http::HttpClient;
use crate::platforms::youtube::requests::{channel, search, video};
use crate::Error;

/// Entry point for the YouTube Data API v3 lookups.
///
/// Holds the API key and the HTTP transport. The request functions in
/// `requests::*` build their URLs through `endpoint` and decode through
/// `get_json`, which enforces the per-call timeout.
pub struct YouTubeClient {
    http: Arc<dyn HttpClient>,
    api_key: String,
    base_url: Url,
    timeout: Duration,
}

impl YouTubeClient {
    pub fn new(http: Arc<dyn HttpClient>, config: &UpstreamConfig) -> Result<Self, Error> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::Config(format!("invalid YouTube base url '{}': {}", base, e)))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url,
            timeout: config.timeout,
        })
    }

    /// `resource` relative to the API root, with `key` appended to `params`.
    pub fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self
            .base_url
            .join(resource)
            .map_err(|e| Error::Config(format!("bad endpoint '{}': {}", resource, e)))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().copied())
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    /// GET + JSON decode under the configured timeout. A garbled body counts as
    /// an upstream failure, like a 5xx would.
    pub async fn get_json<T: DeserializeOwned>(&self, what: &str, url: Url) -> Result<T, Error> {
        let body = tokio::time::timeout(self.timeout, self.http.get(url))
            .await
            .map_err(|_| {
                Error::UpstreamUnavailable(format!("{} timed out after {:?}", what, self.timeout))
            })??;

        serde_json::from_str(&body)
            .map_err(|e| Error::UpstreamUnavailable(format!("{} parse error: {}", what, e)))
    }

    /// Startup diagnostic: one channel lookup, logged either way.
    pub async fn probe(&self, channel_id: &str) -> bool {
        debug!("Probing YouTube API for channel {}", channel_id);
        match channel::fetch_channel(self, channel_id).await {
            Ok(meta) => {
                info!("YouTube API reachable; tracking channel '{}'", meta.name);
                true
            }
            Err(e) => {
                error!("YouTube API probe failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl LiveUpstream for YouTubeClient {
    async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelMetadata, Error> {
        channel::fetch_channel(self, channel_id).await
    }

    async fn find_active_live_video_id(&self, channel_id: &str) -> Result<Option<String>, Error> {
        search::fetch_live_video_id(self, channel_id).await
    }

    async fn resolve_video(&self, video_id: &str) -> Result<VideoDetails, Error> {
        video::fetch_video(self, video_id).await
    }
}
