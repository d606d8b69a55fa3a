//! Principal lookup
//!
//! The guard reads principals through [`PrincipalStore`] so the decision can
//! run against Postgres in production and an in-memory map in tests.

use super::principal::PrincipalRecord;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Principal lookup failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Principal store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Fetch the principal with `id`, or `None` when it does not exist
    async fn find_principal(&self, id: i64) -> Result<Option<PrincipalRecord>, StoreError>;
}

/// Reads principals from the `users` table
#[derive(Debug, Clone)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_principal(&self, id: i64) -> Result<Option<PrincipalRecord>, StoreError> {
        let record = sqlx::query_as::<_, PrincipalRecord>(
            "SELECT id, name, role, permissions FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

/// Map-backed store that counts lookups
#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    records: RwLock<HashMap<i64, PrincipalRecord>>,
    lookups: AtomicUsize,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, record: PrincipalRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&self, record: PrincipalRecord) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(record.id, record);
    }

    pub fn remove(&self, id: i64) -> Option<PrincipalRecord> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.remove(&id)
    }

    /// Number of `find_principal` calls served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    async fn find_principal(&self, id: i64) -> Result<Option<PrincipalRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(records.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, role: &str) -> PrincipalRecord {
        PrincipalRecord {
            id,
            name: format!("user-{id}"),
            role: role.to_string(),
            permissions: None,
        }
    }

    #[tokio::test]
    async fn test_memory_store_lookup_and_count() {
        let store = InMemoryPrincipalStore::new().with(record(1, "administrator"));

        assert!(store.find_principal(1).await.unwrap().is_some());
        assert!(store.find_principal(2).await.unwrap().is_none());
        assert_eq!(store.lookups(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_reflects_mutations() {
        let store = InMemoryPrincipalStore::new().with(record(3, "technician"));
        store.insert(record(3, "auditor"));
        assert_eq!(store.find_principal(3).await.unwrap().unwrap().role, "auditor");

        store.remove(3);
        assert!(store.find_principal(3).await.unwrap().is_none());
    }
}
