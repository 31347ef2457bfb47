use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use livewatch_common::traits::{KeyValueRepository, StoredValue};

use crate::Error;

/// Durable variant: one row per key in `live_state`.
#[derive(Clone)]
pub struct PostgresKeyValueRepository {
    pool: Pool<Postgres>,
}

impl PostgresKeyValueRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueRepository for PostgresKeyValueRepository {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>, Error> {
        let row = sqlx::query(
            r#"
            SELECT value, expires_at
            FROM live_state
            WHERE key = $1
            "#
        )
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            let value: String = r.try_get("value")?;
            let expires_at: Option<DateTime<Utc>> = r.try_get("expires_at")?;
            Ok(Some(StoredValue { value, expires_at }))
        } else {
            Ok(None)
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), Error> {
        let expires_at = ttl.and_then(|t| Utc::now().checked_add_signed(t));
        sqlx::query(
            r#"
            INSERT INTO live_state (key, value, expires_at, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (key) DO UPDATE
                SET value = EXCLUDED.value,
                    expires_at = EXCLUDED.expires_at,
                    updated_at = EXCLUDED.updated_at
            "#
        )
            .bind(key)
            .bind(value)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
