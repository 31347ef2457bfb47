// File: livewatch-core/src/cache/status_store.rs

use std::sync::Arc;

use tracing::warn;

use livewatch_common::models::StatusRecord;
use livewatch_common::traits::{KeyValueRepository, CURRENT_KEY};

use crate::Error;

/// Holds the single current `StatusRecord` under the `current` key.
/// Writes replace the whole value; the last writer wins.
#[derive(Clone)]
pub struct StatusStore {
    repo: Arc<dyn KeyValueRepository>,
}

impl StatusStore {
    pub fn new(repo: Arc<dyn KeyValueRepository>) -> Self {
        Self { repo }
    }

    /// `None` when nothing is stored, the stored value is corrupt, or the
    /// backing store cannot be read. All three mean "reconcile".
    pub async fn get(&self) -> Option<StatusRecord> {
        let stored = match self.repo.get(CURRENT_KEY).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!("Status store read failed: {}", e);
                return None;
            }
        };

        let record = StatusRecord::from_stored(&stored.value);
        if record.is_none() {
            warn!("Stored status is empty or corrupt; treating as cold");
        }
        record
    }

    pub async fn set(&self, record: &StatusRecord) -> Result<(), Error> {
        self.repo.put(CURRENT_KEY, &record.to_json(), None).await
    }
}
