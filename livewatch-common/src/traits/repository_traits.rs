use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::Error;

/// Key holding the cached `ChannelMetadata`.
pub const CHANNEL_KEY: &str = "channel";
/// Key holding the current `StatusRecord`.
pub const CURRENT_KEY: &str = "current";

/// A raw stored value plus its expiry, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Keyed string storage behind the status store and the metadata cache.
///
/// Expired entries are still returned by `get`; callers decide whether a
/// stale value is better than nothing.
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, Error>;

    /// Replaces the value under `key`. `ttl = None` never expires.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), Error>;
}
