//! Append-only persistence of contact submissions.
//!
//! Every backend implements [`ContactStore`]. Records are written once and never
//! read back by the site itself; the stored data is an audit log for the owner.
//!
//! - [`JsonFileStore`] keeps every record in one JSON array on local disk.
//! - [`FirestoreStore`] inserts one document per submission into a Firestore collection.
//! - [`MemoryStore`] keeps records in process, for development and tests.

mod file;
mod firestore;
mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::contact::{NewContact, StoredId};

pub use file::JsonFileStore;
pub use firestore::{FirestoreConfig, FirestoreStore, ServiceAccountKey, TokenSource};
pub use memory::MemoryStore;

/// Durable, append-only storage for contact submissions.
#[async_trait]
pub trait ContactStore: Send + Sync + 'static {
    /// Persist one submission and return the identifier it was stored under.
    async fn append(&self, contact: &NewContact) -> Result<StoredId, StorageError>;

    /// Short backend name used in logs.
    fn kind(&self) -> &'static str;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} does not hold a list of contact records: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode contact records: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("document store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document store rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected document store response: {0}")]
    Response(String),

    #[error("invalid service account key: {0}")]
    Credentials(#[source] jsonwebtoken::errors::Error),

    #[error("token endpoint rejected the grant ({status}): {body}")]
    TokenRejected { status: u16, body: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
