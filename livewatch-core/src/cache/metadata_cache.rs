// File: livewatch-core/src/cache/metadata_cache.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use livewatch_common::models::ChannelMetadata;
use livewatch_common::traits::{KeyValueRepository, LiveUpstream, CHANNEL_KEY};

use crate::config::MetadataCacheConfig;
use crate::repositories::to_chrono;

/// Channel name/logo, fetched once and reused until the entry expires.
///
/// Resolution never fails from the caller's point of view. When the provider
/// cannot be reached the cache hands out, in order of preference, the last
/// value it ever resolved or the configured fallback, and stores that
/// substitute with the short fallback TTL so the next caller retries soon.
pub struct MetadataCache {
    repo: Arc<dyn KeyValueRepository>,
    upstream: Arc<dyn LiveUpstream>,
    channel_id: String,
    config: MetadataCacheConfig,
}

/// A stored entry and whether it is still inside its TTL.
struct CachedEntry {
    metadata: ChannelMetadata,
    fresh: bool,
}

impl MetadataCache {
    pub fn new(
        repo: Arc<dyn KeyValueRepository>,
        upstream: Arc<dyn LiveUpstream>,
        channel_id: impl Into<String>,
        config: MetadataCacheConfig,
    ) -> Self {
        Self {
            repo,
            upstream,
            channel_id: channel_id.into(),
            config,
        }
    }

    /// Cached value if fresh, otherwise a fetch, otherwise a substitute.
    pub async fn get_or_fetch(&self) -> ChannelMetadata {
        let cached = self.read_entry().await;
        if let Some(CachedEntry { metadata, fresh: true }) = &cached {
            debug!("Using cached channel '{}'", metadata.name);
            return metadata.clone();
        }

        match self.upstream.resolve_channel(&self.channel_id).await {
            Ok(mut metadata) if metadata.is_usable() => {
                if !metadata.has_logo() {
                    warn!("Channel {} resolved without a logo; keeping the known one", self.channel_id);
                    metadata.logo = match cached {
                        Some(entry) => entry.metadata.logo,
                        None => self.config.fallback.logo.clone(),
                    };
                }
                self.write_entry(&metadata, self.config.ttl).await;
                metadata
            }
            Ok(_) => {
                warn!("Channel {} resolved with an empty name; substituting", self.channel_id);
                self.substitute(cached).await
            }
            Err(e) => {
                error!("Channel metadata fetch failed: {}", e);
                self.substitute(cached).await
            }
        }
    }

    /// No network: whatever is stored (fresh or stale), else the fallback.
    pub async fn best_effort(&self) -> ChannelMetadata {
        self.read_entry()
            .await
            .map(|entry| entry.metadata)
            .unwrap_or_else(|| self.config.fallback.clone())
    }

    async fn substitute(&self, cached: Option<CachedEntry>) -> ChannelMetadata {
        let metadata = match cached {
            Some(entry) => {
                debug!("Reusing last known channel '{}'", entry.metadata.name);
                entry.metadata
            }
            None => {
                debug!("Using fallback channel '{}'", self.config.fallback.name);
                self.config.fallback.clone()
            }
        };
        self.write_entry(&metadata, self.config.fallback_ttl).await;
        metadata
    }

    async fn read_entry(&self) -> Option<CachedEntry> {
        let stored = match self.repo.get(CHANNEL_KEY).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!("Metadata cache read failed: {}", e);
                return None;
            }
        };

        let mut metadata: ChannelMetadata = match serde_json::from_str(stored.value.trim()) {
            Ok(m) => m,
            Err(_) => {
                debug!("Ignoring unreadable channel entry");
                return None;
            }
        };
        if !metadata.is_usable() {
            return None;
        }
        if !metadata.has_logo() {
            metadata.logo = self.config.fallback.logo.clone();
        }

        Some(CachedEntry {
            fresh: !stored.is_expired(Utc::now()),
            metadata,
        })
    }

    async fn write_entry(&self, metadata: &ChannelMetadata, ttl: std::time::Duration) {
        let json = match serde_json::to_string(metadata) {
            Ok(j) => j,
            Err(e) => {
                error!("Could not encode channel metadata: {}", e);
                return;
            }
        };
        if let Err(e) = self.repo.put(CHANNEL_KEY, &json, Some(to_chrono(ttl))).await {
            warn!("Metadata cache write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryKeyValueRepository;
    use crate::test_utils::mocks::{MockUpstream, Reply};
    use std::time::Duration;

    fn config() -> MetadataCacheConfig {
        MetadataCacheConfig {
            ttl: Duration::from_secs(3600),
            fallback_ttl: Duration::from_secs(60),
            fallback: ChannelMetadata::new("Fallback", "fallback.png"),
        }
    }

    fn cache(repo: Arc<InMemoryKeyValueRepository>, upstream: Arc<MockUpstream>) -> MetadataCache {
        MetadataCache::new(repo, upstream, "UC1", config())
    }

    #[tokio::test]
    async fn fetches_once_then_serves_from_cache() {
        let upstream = Arc::new(MockUpstream::new());
        upstream.set_channel(Reply::Ok(ChannelMetadata::new("Real", "real.png")));
        let c = cache(Arc::new(InMemoryKeyValueRepository::new()), upstream.clone());

        assert_eq!(c.get_or_fetch().await.name, "Real");
        assert_eq!(c.get_or_fetch().await.name, "Real");
        assert_eq!(upstream.channel_calls(), 1);
    }

    #[tokio::test]
    async fn failure_without_history_uses_fallback_with_short_ttl() {
        let repo = Arc::new(InMemoryKeyValueRepository::new());
        let upstream = Arc::new(MockUpstream::new());
        upstream.set_channel(Reply::Unavailable);
        let c = cache(repo.clone(), upstream);

        let meta = c.get_or_fetch().await;
        assert_eq!(meta.name, "Fallback");

        let stored = repo.get(CHANNEL_KEY).await.unwrap().unwrap();
        let ttl_left = stored.expires_at.unwrap() - Utc::now();
        assert!(ttl_left <= chrono::Duration::seconds(60));
    }

    #[tokio::test]
    async fn failure_after_expiry_keeps_last_known_name() {
        let repo = Arc::new(InMemoryKeyValueRepository::new());
        repo.put(
            CHANNEL_KEY,
            r#"{"name":"Real","logo":"real.png"}"#,
            Some(chrono::Duration::seconds(-5)),
        )
        .await
        .unwrap();
        let upstream = Arc::new(MockUpstream::new());
        upstream.set_channel(Reply::Unavailable);
        let c = cache(repo, upstream.clone());

        let meta = c.get_or_fetch().await;
        assert_eq!(meta, ChannelMetadata::new("Real", "real.png"));
        assert_eq!(upstream.channel_calls(), 1);
    }

    #[tokio::test]
    async fn refetch_without_logo_keeps_last_known_logo() {
        let repo = Arc::new(InMemoryKeyValueRepository::new());
        repo.put(
            CHANNEL_KEY,
            r#"{"name":"Real","logo":"https://real/logo.png"}"#,
            Some(chrono::Duration::seconds(-5)),
        )
        .await
        .unwrap();
        let upstream = Arc::new(MockUpstream::new());
        upstream.set_channel(Reply::Ok(ChannelMetadata::new("Renamed", "")));
        let c = cache(repo.clone(), upstream);

        let meta = c.get_or_fetch().await;
        assert_eq!(meta, ChannelMetadata::new("Renamed", "https://real/logo.png"));

        let stored = repo.get(CHANNEL_KEY).await.unwrap().unwrap();
        assert!(stored.value.contains("https://real/logo.png"));
    }

    #[tokio::test]
    async fn first_fetch_without_logo_uses_fallback_logo() {
        let upstream = Arc::new(MockUpstream::new());
        upstream.set_channel(Reply::Ok(ChannelMetadata::new("Real", "")));
        let c = cache(Arc::new(InMemoryKeyValueRepository::new()), upstream);

        assert_eq!(c.get_or_fetch().await, ChannelMetadata::new("Real", "fallback.png"));
    }

    #[tokio::test]
    async fn stored_blank_logo_is_never_handed_out() {
        let repo = Arc::new(InMemoryKeyValueRepository::new());
        repo.put(CHANNEL_KEY, r#"{"name":"Real","logo":""}"#, None)
            .await
            .unwrap();
        let c = cache(repo, Arc::new(MockUpstream::new()));

        assert_eq!(c.best_effort().await.logo, "fallback.png");
        assert_eq!(c.get_or_fetch().await.logo, "fallback.png");
    }

    #[tokio::test]
    async fn best_effort_never_calls_upstream() {
        let upstream = Arc::new(MockUpstream::new());
        let c = cache(Arc::new(InMemoryKeyValueRepository::new()), upstream.clone());
        assert_eq!(c.best_effort().await.name, "Fallback");
        assert_eq!(upstream.channel_calls(), 0);
    }
}
