use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ContactStore, StorageError};
use crate::contact::{ContactRecord, NewContact, StoredId};

/// Keeps every contact in a single JSON array on local disk.
///
/// Each append reads the whole file, pushes the new record and replaces the file.
/// The read-modify-write runs under a mutex owned by the store and the new
/// contents are written to a sibling temporary file before being renamed over the
/// target, so concurrent submissions in one process never lose records and a
/// crash mid-write leaves the previous list intact. Separate processes sharing
/// the same file are not coordinated.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record. A missing or blank file is an empty list.
    pub async fn load(&self) -> Result<Vec<ContactRecord>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn replace(&self, records: &[ContactRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let bytes = serde_json::to_vec_pretty(records).map_err(StorageError::Encode)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "contacts.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Clock-derived id, bumped past the previous record so ids stay unique and increasing.
fn next_id(last: Option<&ContactRecord>, candidate: i64) -> i64 {
    match last {
        Some(last) if last.id >= candidate => last.id + 1,
        _ => candidate,
    }
}

#[async_trait]
impl ContactStore for JsonFileStore {
    async fn append(&self, contact: &NewContact) -> Result<StoredId, StorageError> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        let id = next_id(records.last(), contact.timestamp_millis());
        records.push(ContactRecord::new(id, contact));
        self.replace(&records).await?;

        tracing::debug!(path = %self.path.display(), id, total = records.len(), "contacts file updated");
        Ok(StoredId::from(id))
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}
