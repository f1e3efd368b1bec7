//! Contact form submissions and their persisted form.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Raw body of the contact form.
///
/// Missing fields become empty strings; nothing else is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// A submission stamped with the time it was received, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: OffsetDateTime,
}

impl NewContact {
    pub fn new(form: ContactForm, received_at: OffsetDateTime) -> Self {
        let ContactForm {
            name,
            email,
            message,
        } = form;
        NewContact {
            name,
            email,
            message,
            received_at,
        }
    }

    /// Milliseconds since the Unix epoch of `received_at`.
    pub fn timestamp_millis(&self) -> i64 {
        (self.received_at.unix_timestamp_nanos() / 1_000_000) as i64
    }
}

/// One entry of the contacts file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}

impl ContactRecord {
    pub fn new(id: i64, contact: &NewContact) -> Self {
        ContactRecord {
            id,
            name: contact.name.clone(),
            email: contact.email.clone(),
            message: contact.message.clone(),
            received_at: contact.received_at,
        }
    }
}

/// Identifier a storage backend assigned to a stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredId(String);

impl StoredId {
    pub fn new(id: impl Into<String>) -> Self {
        StoredId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for StoredId {
    fn from(id: i64) -> Self {
        StoredId(id.to_string())
    }
}

impl fmt::Display for StoredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
