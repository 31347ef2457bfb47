use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use livewatch_common::traits::{KeyValueRepository, StoredValue};

use crate::Error;

/// Process-lifetime storage. Used when no database is configured.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueRepository {
    entries: Arc<RwLock<HashMap<String, StoredValue>>>,
}

impl InMemoryKeyValueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueRepository for InMemoryKeyValueRepository {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, Error> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), Error> {
        let stored = StoredValue {
            value: value.to_string(),
            expires_at: ttl.and_then(|t| Utc::now().checked_add_signed(t)),
        };
        self.entries.write().await.insert(key.to_string(), stored);
        Ok(())
    }
}
