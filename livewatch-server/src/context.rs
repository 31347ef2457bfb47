//! livewatch-server/src/context.rs
//!
//! Builds the wired-up pipeline (storage, provider client, caches) from the
//! command line.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use livewatch_common::models::ChannelMetadata;
use livewatch_common::traits::KeyValueRepository;
use livewatch_core::config::{MetadataCacheConfig, PipelineConfig, UpstreamConfig};
use livewatch_core::db::Database;
use livewatch_core::platforms::youtube::YouTubeClient;
use livewatch_core::repositories::{InMemoryKeyValueRepository, PostgresKeyValueRepository};
use livewatch_core::services::LivePipeline;
use livewatch_core::{DefaultHttpClient, Error};

use crate::Args;

/// Everything the HTTP layer needs, plus the handles kept for startup and
/// shutdown.
pub struct ServerContext {
    /// Present only in the durable variant.
    pub db: Option<Database>,
    pub youtube: Arc<YouTubeClient>,
    pub pipeline: LivePipeline,
}

impl ServerContext {
    pub async fn new(args: &Args) -> Result<Self, Error> {
        let (db, repo): (Option<Database>, Arc<dyn KeyValueRepository>) = match &args.database_url {
            Some(url) => {
                let db = Database::connect(url).await?;
                let repo = Arc::new(PostgresKeyValueRepository::new(db.pool().clone()));
                (Some(db), repo)
            }
            None => {
                info!("No database configured; keeping state in memory");
                (None, Arc::new(InMemoryKeyValueRepository::new()))
            }
        };

        let upstream_config = UpstreamConfig {
            api_key: args.api_key.clone(),
            base_url: args.youtube_base_url.clone(),
            timeout: Duration::from_secs(args.upstream_timeout_secs),
        };
        let http = Arc::new(DefaultHttpClient::new(upstream_config.timeout)?);
        let youtube = Arc::new(YouTubeClient::new(http, &upstream_config)?);

        let pipeline = LivePipeline::new(pipeline_config(args), youtube.clone(), repo);

        Ok(Self { db, youtube, pipeline })
    }
}

fn pipeline_config(args: &Args) -> PipelineConfig {
    let mut config = PipelineConfig::new(args.channel_id.clone());
    config.metadata = MetadataCacheConfig {
        ttl: Duration::from_secs(args.metadata_ttl_secs),
        fallback_ttl: Duration::from_secs(args.fallback_ttl_secs),
        fallback: ChannelMetadata::new(
            args.fallback_channel_name.clone(),
            args.fallback_channel_logo.clone(),
        ),
    };
    config.subscriber_buffer = args.subscriber_buffer;
    config.heartbeat = Duration::from_secs(args.heartbeat_secs);
    config
}
