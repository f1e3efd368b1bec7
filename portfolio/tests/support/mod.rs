#![allow(dead_code)]

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use portfolio::contact::{NewContact, StoredId};
use portfolio::mail::{Email, MailError, Mailer, MessageId};
use portfolio::storage::{ContactStore, StorageError};
use portfolio::AppState;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const OWNER: &str = "owner@example.com";
pub const SENDER: &str = "onboarding@resend.dev";

/// A store whose disk is always unavailable.
pub struct FailingStore;

#[async_trait]
impl ContactStore for FailingStore {
    async fn append(&self, _contact: &NewContact) -> Result<StoredId, StorageError> {
        Err(StorageError::Io {
            path: "data/contacts.json".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only file system"),
        })
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}

/// Records every message it is asked to send, optionally failing each send.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        RecordingMailer {
            fail: true,
            ..Default::default()
        }
    }

    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<MessageId, MailError> {
        let mut sent = self.sent.lock().await;
        sent.push(email.clone());
        if self.fail {
            return Err(MailError::Smtp("connection refused".into()));
        }
        Ok(MessageId::new(format!("msg-{}", sent.len())))
    }

    fn kind(&self) -> &'static str {
        "recording"
    }
}

pub fn state(store: Arc<dyn ContactStore>, mailer: Arc<dyn Mailer>) -> AppState {
    AppState::new(store, mailer, SENDER, OWNER)
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn spawn_app(state: AppState) -> String {
    spawn(portfolio::router(state)).await
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
