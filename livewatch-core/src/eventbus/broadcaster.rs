// File: livewatch-core/src/eventbus/broadcaster.rs

use std::sync::Arc;

use tracing::{debug, error};

use livewatch_common::models::{StatusRecord, StreamEvent};

use crate::cache::StatusStore;
use crate::eventbus::{DeliveryReport, Payload, SubscriptionRegistry};

/// Writes a new status to the store, then pushes it to every subscriber.
pub struct Broadcaster {
    store: StatusStore,
    registry: SubscriptionRegistry,
}

impl Broadcaster {
    pub fn new(store: StatusStore, registry: SubscriptionRegistry) -> Self {
        Self { store, registry }
    }

    /// Replace the stored status and fan it out. A failed store write is
    /// logged and delivery still happens; a failed send never undoes the write.
    pub async fn publish(&self, status: StatusRecord) -> DeliveryReport {
        if let Err(e) = self.store.set(&status).await {
            error!("Failed to persist status: {}", e);
        }

        let live = status.is_live();
        let payload: Payload = Arc::from(StreamEvent::Status(status).to_payload());
        let report = self.registry.deliver(payload);
        debug!(
            "Published status (live={}) to {} subscriber(s), dropped {}",
            live, report.delivered, report.dropped
        );
        report
    }

    /// Side-effect free read of the stored status.
    pub async fn current(&self) -> Option<StatusRecord> {
        self.store.get().await
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }
}
