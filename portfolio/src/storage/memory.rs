use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ContactStore, StorageError};
use crate::contact::{ContactRecord, NewContact, StoredId};

/// In-memory [`ContactStore`] for development and testing.
///
/// Records live in a `Vec` behind a mutex and are lost on restart. Ids are the
/// 1-based insertion position.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<ContactRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, in insertion order.
    pub async fn records(&self) -> Vec<ContactRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn append(&self, contact: &NewContact) -> Result<StoredId, StorageError> {
        let mut records = self.records.lock().await;
        let id = records.len() as i64 + 1;
        records.push(ContactRecord::new(id, contact));
        Ok(StoredId::from(id))
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
