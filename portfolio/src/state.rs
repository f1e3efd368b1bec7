use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::{AppConfig, ConfigError};
use crate::mail::Mailer;
use crate::notify::ContactNotifier;
use crate::pipeline::ContactService;
use crate::storage::ContactStore;

/// Shared handles for request handlers, built once at startup.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub contacts: ContactService,
}

impl AppState {
    pub fn new(store: Arc<dyn ContactStore>, mailer: Arc<dyn Mailer>, from: &str, to: &str) -> Self {
        let notifier = ContactNotifier::new(mailer, from, to);
        AppState {
            contacts: ContactService::new(store, notifier),
        }
    }

    /// Build the configured backends. Fails on any missing or invalid setting.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let to = config.recipient()?;
        let store = config.contact_store()?;
        let (mailer, from) = config.mailer()?;
        Ok(AppState::new(store, mailer, &from, to))
    }
}
