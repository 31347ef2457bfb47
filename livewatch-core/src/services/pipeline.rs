// File: livewatch-core/src/services/pipeline.rs

use std::sync::Arc;

use livewatch_common::traits::{KeyValueRepository, LiveUpstream};

use crate::cache::{MetadataCache, StatusStore};
use crate::config::PipelineConfig;
use crate::eventbus::{Broadcaster, SubscriptionRegistry};
use crate::services::reconciler::Reconciler;
use crate::services::webhook::WebhookIngestor;

/// The wired-up status pipeline. Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct LivePipeline {
    pub config: PipelineConfig,
    pub upstream: Arc<dyn LiveUpstream>,
    pub metadata: Arc<MetadataCache>,
    pub registry: SubscriptionRegistry,
    pub broadcaster: Arc<Broadcaster>,
    pub reconciler: Arc<Reconciler>,
    pub ingestor: Arc<WebhookIngestor>,
}

impl LivePipeline {
    pub fn new(
        config: PipelineConfig,
        upstream: Arc<dyn LiveUpstream>,
        repo: Arc<dyn KeyValueRepository>,
    ) -> Self {
        let metadata = Arc::new(MetadataCache::new(
            repo.clone(),
            upstream.clone(),
            config.channel_id.clone(),
            config.metadata.clone(),
        ));
        let registry = SubscriptionRegistry::new(config.subscriber_buffer);
        let broadcaster = Arc::new(Broadcaster::new(StatusStore::new(repo), registry.clone()));
        let reconciler = Arc::new(Reconciler::new(
            config.channel_id.clone(),
            upstream.clone(),
            metadata.clone(),
            broadcaster.clone(),
        ));
        let ingestor = Arc::new(WebhookIngestor::new(
            config.channel_id.clone(),
            upstream.clone(),
            metadata.clone(),
            broadcaster.clone(),
        ));

        Self {
            config,
            upstream,
            metadata,
            registry,
            broadcaster,
            reconciler,
            ingestor,
        }
    }
}
