//! livewatch-core/src/eventbus/mod.rs
//!
//! Fan-out of serialized status payloads to attached live-stream clients.
//! Each subscriber owns a bounded MPSC queue; the registry keeps the sending
//! halves and forgets any whose queue refuses a payload.

pub mod broadcaster;

pub use broadcaster::Broadcaster;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Opaque handle for an attached subscriber.
pub type SubscriberId = u64;

/// A serialized JSON payload, shared between all receivers of one publish.
pub type Payload = Arc<str>;

/// Default size for each subscriber's buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 16;

/// What `attach` hands back to a connection handler.
pub struct Subscription {
    pub id: SubscriberId,
    /// Lets the handler send its own first frames (snapshot, loading marker).
    pub sender: mpsc::Sender<Payload>,
    pub receiver: mpsc::Receiver<Payload>,
}

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// The set of currently attached output channels.
#[derive(Clone)]
pub struct SubscriptionRegistry {
    subscribers: Arc<Mutex<HashMap<SubscriberId, mpsc::Sender<Payload>>>>,
    next_id: Arc<AtomicU64>,
    buffer_size: usize,
    shutdown_tx: Arc<watch::Sender<bool>>,
    pub shutdown_rx: watch::Receiver<bool>,
}

impl SubscriptionRegistry {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            buffer_size: buffer_size.max(1),
            shutdown_tx: Arc::new(tx),
            shutdown_rx: rx,
        }
    }

    /// Registers a new subscriber with its own queue.
    pub fn attach(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.buffer_size);
        self.subscribers.lock().insert(id, tx.clone());
        debug!("Subscriber {} attached", id);
        Subscription {
            id,
            sender: tx,
            receiver: rx,
        }
    }

    /// Removes a subscriber. Returns false if it was already gone.
    pub fn detach(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.lock().remove(&id).is_some();
        if removed {
            debug!("Subscriber {} detached", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offers `payload` to every subscriber without waiting on any of them.
    /// A closed or full queue is a failed send and the subscriber is dropped.
    pub fn deliver(&self, payload: Payload) -> DeliveryReport {
        let senders: Vec<(SubscriberId, mpsc::Sender<Payload>)> = {
            let subs = self.subscribers.lock();
            subs.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let mut report = DeliveryReport::default();
        for (id, tx) in senders {
            match tx.try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Subscriber {} is not keeping up; dropping it", id);
                    self.detach(id);
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    self.detach(id);
                    report.dropped += 1;
                }
            }
        }
        report
    }

    /// Closes every queue and signals open streams to finish.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        self.subscribers.lock().clear();
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Resolves once `shutdown` has been called.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + use<> {
        let mut rx = self.shutdown_rx.clone();
        async move {
            let _ = rx.wait_for(|stopped| *stopped).await;
        }
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}
