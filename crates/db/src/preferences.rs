use async_trait::async_trait;
use serde_json::Value;

use kotoba_core::{PreferenceStore, StoreError};

use crate::DbPool;

/// SQLite-backed preference store. Values are stored JSON-encoded in a
/// single key/value table, so subscription codes, disabled flags, and
/// idempotency markers all share one schema.
pub struct SqlPreferenceStore {
    pool: DbPool,
}

impl SqlPreferenceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for SqlPreferenceStore {
    async fn select(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM preference WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend_error)?;

        row.map(|(raw,)| serde_json::from_str(&raw))
            .transpose()
            .map_err(|error| StoreError::Backend(format!("invalid value under `{key}`: {error}")))
    }

    async fn upsert(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&value)
            .map_err(|error| StoreError::Backend(format!("unencodable value: {error}")))?;

        sqlx::query(
            "INSERT INTO preference (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(key)
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(())
    }
}

fn backend_error(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}
