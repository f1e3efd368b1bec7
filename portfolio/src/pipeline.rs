//! Contact form submission: persist, notify, report.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::contact::{ContactForm, NewContact, StoredId};
use crate::mail::MessageId;
use crate::notify::ContactNotifier;
use crate::storage::{ContactStore, StorageError};

/// Outcome of a stored submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: StoredId,
    pub contact: NewContact,
    /// `None` when the notification could not be sent.
    pub notification: Option<MessageId>,
}

/// Runs the contact form pipeline against injected storage and mail backends.
///
/// Storage failures abort the submission before any email is attempted.
/// Notification is awaited but best-effort: a failed send is logged and the
/// submission still succeeds.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    notifier: ContactNotifier,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>, notifier: ContactNotifier) -> Self {
        ContactService { store, notifier }
    }

    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    pub fn mailer_kind(&self) -> &'static str {
        self.notifier.mailer_kind()
    }

    #[tracing::instrument(name = "contact_submission", skip_all, fields(store = self.store.kind()))]
    pub async fn submit(&self, form: ContactForm) -> Result<Submission, StorageError> {
        let contact = NewContact::new(form, OffsetDateTime::now_utc());

        let id = match self.store.append(&contact).await {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(error = %err, "failed to store contact");
                return Err(err);
            }
        };
        tracing::info!(%id, "contact stored");

        let notification = match self.notifier.notify(&contact).await {
            Ok(message_id) => {
                tracing::info!(%id, %message_id, "notification sent");
                Some(message_id)
            }
            Err(err) => {
                tracing::error!(%id, error = %err, "failed to send notification");
                None
            }
        };

        Ok(Submission {
            id,
            contact,
            notification,
        })
    }
}
