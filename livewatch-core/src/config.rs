// File: livewatch-core/src/config.rs

use std::time::Duration;

use livewatch_common::models::ChannelMetadata;

/// How the provider is reached.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: String,
    /// Must point at the Data API v3 root, e.g. `https://www.googleapis.com/youtube/v3/`.
    pub base_url: String,
    /// Applied to each lookup on top of whatever the HTTP client enforces.
    pub timeout: Duration,
}

pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

impl UpstreamConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
            timeout: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetadataCacheConfig {
    /// Lifetime of a successfully fetched entry.
    pub ttl: Duration,
    /// Lifetime of a substituted entry, so a failed fetch is retried sooner.
    pub fallback_ttl: Duration,
    /// Used when nothing was ever resolved.
    pub fallback: ChannelMetadata,
}

impl Default for MetadataCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            fallback_ttl: Duration::from_secs(60 * 60),
            fallback: ChannelMetadata::new("Live channel", "https://www.youtube.com/favicon.ico"),
        }
    }
}

/// Everything the status pipeline needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The one channel this process tracks.
    pub channel_id: String,
    pub metadata: MetadataCacheConfig,
    /// Queue depth per attached subscriber.
    pub subscriber_buffer: usize,
    /// Upper bound a connecting client waits for a cold-start reconcile.
    pub reconcile_timeout: Duration,
    /// Idle comment interval on live streams.
    pub heartbeat: Duration,
}

impl PipelineConfig {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            metadata: MetadataCacheConfig::default(),
            subscriber_buffer: 16,
            reconcile_timeout: Duration::from_secs(30),
            heartbeat: Duration::from_secs(15),
        }
    }
}
