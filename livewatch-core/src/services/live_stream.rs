// File: livewatch-core/src/services/live_stream.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use livewatch_common::models::StreamEvent;

use crate::eventbus::Payload;
use crate::services::reconciler::Reconciler;

/// How a freshly attached subscriber got its first status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimeOutcome {
    /// The store was warm.
    Snapshot,
    /// Store was cold; a reconcile produced the status.
    Reconciled,
    /// Store was cold and the reconcile did not finish in time; an error
    /// marker was sent.
    Failed,
}

/// First frames for a new subscriber: the stored snapshot, or a loading
/// marker followed by the result of a reconcile (bounded by `bound`).
///
/// The reconcile also publishes through the registry, so this subscriber may
/// see the record twice. Send errors mean the client already left and are
/// ignored; the shared reconcile keeps running for everyone else.
pub async fn prime_subscriber(
    reconciler: Arc<Reconciler>,
    sender: mpsc::Sender<Payload>,
    bound: Duration,
) -> PrimeOutcome {
    if let Some(current) = reconciler.broadcaster().current().await {
        send(&sender, StreamEvent::Status(current)).await;
        return PrimeOutcome::Snapshot;
    }

    send(&sender, StreamEvent::Loading).await;

    match tokio::time::timeout(bound, reconciler.refresh()).await {
        Ok(Ok(record)) => {
            send(&sender, StreamEvent::Status(record)).await;
            PrimeOutcome::Reconciled
        }
        Ok(Err(e)) => {
            warn!("Reconcile for new subscriber failed: {}", e);
            send(&sender, StreamEvent::Error).await;
            PrimeOutcome::Failed
        }
        Err(_) => {
            warn!("Reconcile for new subscriber exceeded {:?}", bound);
            send(&sender, StreamEvent::Error).await;
            PrimeOutcome::Failed
        }
    }
}

async fn send(sender: &mpsc::Sender<Payload>, event: StreamEvent) {
    if sender.send(Arc::from(event.to_payload())).await.is_err() {
        debug!("Subscriber went away before its first frame");
    }
}
