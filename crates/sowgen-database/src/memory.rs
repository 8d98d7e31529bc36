//! In-memory document collection using a Tokio `RwLock` for single-node
//! deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;
#[cfg(any(test, feature = "test-helpers"))]
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;
use tracing::debug;

use sowgen_core::error::AppError;
use sowgen_core::result::AppResult;
use sowgen_core::types::SowId;
use sowgen_entity::sow::Sow;

use crate::collection::{SowCollection, SowFilter, SowMutation, SowQuery};

/// In-memory [`SowCollection`].
///
/// Each conditional operation holds the write lock for the predicate check
/// and the mutation, so they are atomic with respect to each other.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    /// Documents by id.
    docs: Arc<RwLock<HashMap<SowId, Sow>>>,
    /// Simulated outage switch.
    #[cfg(any(test, feature = "test-helpers"))]
    offline: Arc<AtomicBool>,
}

impl MemoryCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Whether the collection holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// Make every subsequent call fail as if the store were unreachable.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> AppResult<()> {
        #[cfg(any(test, feature = "test-helpers"))]
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::persistence("In-memory collection is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl SowCollection for MemoryCollection {
    async fn find_one(&self, id: SowId) -> AppResult<Option<Sow>> {
        self.ensure_available()?;
        Ok(self.docs.read().await.get(&id).cloned())
    }

    async fn insert_one(&self, sow: &Sow) -> AppResult<()> {
        self.ensure_available()?;
        let mut docs = self.docs.write().await;
        if docs.contains_key(&sow.id) {
            return Err(AppError::conflict(format!("SOW {} already exists", sow.id)));
        }
        docs.insert(sow.id, sow.clone());
        Ok(())
    }

    async fn find_one_and_update(
        &self,
        filter: SowFilter,
        mutation: SowMutation,
    ) -> AppResult<Option<Sow>> {
        self.ensure_available()?;
        let mut docs = self.docs.write().await;

        let Some(current) = docs.get_mut(&filter.id) else {
            return Ok(None);
        };
        if !filter.matches(current) {
            debug!(sow_id = %filter.id, "Conditional update predicate did not match");
            return Ok(None);
        }

        mutation.apply_to(current)?;

        Ok(Some(current.clone()))
    }

    async fn delete_one(&self, filter: SowFilter) -> AppResult<u64> {
        self.ensure_available()?;
        let mut docs = self.docs.write().await;

        match docs.get(&filter.id) {
            Some(current) if filter.matches(current) => {
                docs.remove(&filter.id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn find(&self, query: SowQuery) -> BoxStream<'_, AppResult<Sow>> {
        if let Err(e) = self.ensure_available() {
            return stream::once(async move { Err(e) }).boxed();
        }

        let docs = Arc::clone(&self.docs);
        stream::once(async move {
            let docs = docs.read().await;
            let mut matched: Vec<Sow> = docs
                .values()
                .filter(|s| query.matches(s))
                .cloned()
                .collect();
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            stream::iter(matched.into_iter().map(Ok))
        })
        .flatten()
        .boxed()
    }
}
