// File: livewatch-core/src/services/reconciler.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use livewatch_common::models::{ChannelMetadata, StatusRecord};
use livewatch_common::traits::LiveUpstream;

use crate::cache::MetadataCache;
use crate::eventbus::Broadcaster;
use crate::Error;

type InFlight = Shared<BoxFuture<'static, Result<StatusRecord, String>>>;

/// The running refresh, tagged so only its own completion clears the slot.
struct Slot {
    generation: u64,
    run: InFlight,
}

/// Re-establishes ground truth from the provider: channel lookup, live search,
/// then video details.
pub struct Reconciler {
    channel_id: String,
    upstream: Arc<dyn LiveUpstream>,
    metadata: Arc<MetadataCache>,
    broadcaster: Arc<Broadcaster>,
    inflight: Mutex<Option<Slot>>,
    generation: AtomicU64,
}

impl Reconciler {
    pub fn new(
        channel_id: impl Into<String>,
        upstream: Arc<dyn LiveUpstream>,
        metadata: Arc<MetadataCache>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            upstream,
            metadata,
            broadcaster,
            inflight: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Always yields a well-formed record. Any upstream failure degrades to
    /// "offline" with the best metadata available.
    pub async fn reconcile(&self) -> StatusRecord {
        let channel = self.metadata.get_or_fetch().await;
        match self.poll(&channel).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Reconciliation failed, falling back to offline: {}", e);
                StatusRecord::offline(&channel, Utc::now())
            }
        }
    }

    async fn poll(&self, channel: &ChannelMetadata) -> Result<StatusRecord, Error> {
        let Some(video_id) = self.upstream.find_active_live_video_id(&self.channel_id).await? else {
            debug!("No active broadcast for {}", self.channel_id);
            return Ok(StatusRecord::offline(channel, Utc::now()));
        };

        match self.upstream.resolve_video(&video_id).await {
            Ok(video) => Ok(StatusRecord::from_video(video, channel, Utc::now())),
            Err(Error::NotFound(what)) => {
                debug!("Live search pointed at missing {}", what);
                Ok(StatusRecord::offline(channel, Utc::now()))
            }
            Err(e) => Err(e),
        }
    }

    /// Reconcile and publish. Concurrent callers share one in-flight run,
    /// which executes on its own task so a caller going away does not cancel
    /// it.
    pub async fn refresh(self: &Arc<Self>) -> Result<StatusRecord, Error> {
        let shared = {
            let mut slot = self.inflight.lock().await;
            match slot.as_ref() {
                Some(running) => {
                    debug!("Joining in-flight reconciliation");
                    running.run.clone()
                }
                None => {
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed);

                    let worker = Arc::clone(self);
                    let handle = tokio::spawn(async move {
                        let record = worker.reconcile().await;
                        worker.broadcaster.publish(record.clone()).await;
                        worker.finish(generation).await;
                        record
                    });

                    // Also clears the slot if the worker panicked.
                    let owner = Arc::clone(self);
                    let run = async move {
                        let result = handle.await.map_err(|e| e.to_string());
                        owner.finish(generation).await;
                        result
                    }
                    .boxed()
                    .shared();

                    *slot = Some(Slot {
                        generation,
                        run: run.clone(),
                    });
                    run
                }
            }
        };

        shared.await.map_err(Error::Task)
    }

    async fn finish(&self, generation: u64) {
        let mut slot = self.inflight.lock().await;
        if slot.as_ref().is_some_and(|s| s.generation == generation) {
            *slot = None;
        }
    }

    /// Startup step: reconcile only if nothing usable is stored yet.
    pub async fn ensure_initial_status(self: &Arc<Self>) -> Result<StatusRecord, Error> {
        if let Some(current) = self.broadcaster.current().await {
            info!("Status store already warm (live={})", current.is_live());
            return Ok(current);
        }
        info!("Status store empty; running initial poll");
        let record = self.refresh().await?;
        info!("Initial poll done (live={})", record.is_live());
        Ok(record)
    }
}
