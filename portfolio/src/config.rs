//! Environment configuration and construction of the storage and mail backends.

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::mail::{LogMailer, MailError, Mailer, ResendConfig, ResendMailer, SmtpMailer};
use crate::storage::{
    ContactStore, FirestoreConfig, FirestoreStore, JsonFileStore, MemoryStore, ServiceAccountKey,
    StorageError, TokenSource,
};

/// Deserialize any config struct from environment variables (keys are lowercased).
pub trait EnvConfig: Sized {
    fn from_env() -> Result<Self, config::ConfigError>;
    fn from_env_with_prefix(prefix: &str) -> Result<Self, config::ConfigError>;
}

impl<D> EnvConfig for D
where
    D: DeserializeOwned,
{
    fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix))
            .build()?
            .try_deserialize()
    }
}

/// Startup configuration problems. Any of these stops the process before it serves.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Env(#[from] config::ConfigError),

    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("mail backend: {0}")]
    Mail(#[from] MailError),

    #[error("storage backend: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Firestore,
    Memory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    #[default]
    Resend,
    Smtp,
    Log,
}

/// Site configuration, read from the environment (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default = "default_contacts_file")]
    pub contacts_file: PathBuf,

    pub firebase_project_id: Option<String>,
    pub firebase_client_email: Option<String>,
    /// PEM key; literal `\n` sequences are read as newlines.
    pub firebase_private_key: Option<String>,
    /// Service account JSON, inline.
    pub firebase_credentials: Option<String>,
    /// Service account JSON, on disk.
    pub google_application_credentials: Option<PathBuf>,
    pub firebase_access_token: Option<String>,
    pub firestore_emulator_host: Option<String>,
    #[serde(default = "default_collection")]
    pub firestore_collection: String,

    #[serde(default)]
    pub mail_transport: MailTransport,
    pub resend_api_key: Option<String>,
    pub resend_base_url: Option<String>,
    /// Sender of notifications. Defaults to Resend's shared sender, or `SMTP_FROM` for SMTP.
    pub mail_from: Option<String>,
    /// Recipient of notifications.
    pub email_user: Option<String>,
}

fn default_port() -> u16 {
    3000
}

fn default_contacts_file() -> PathBuf {
    PathBuf::from("data/contacts.json")
}

fn default_collection() -> String {
    "contacts".to_string()
}

const RESEND_SHARED_SENDER: &str = "onboarding@resend.dev";

#[derive(Deserialize)]
struct ServiceAccount {
    project_id: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
    token_uri: Option<String>,
}

impl AppConfig {
    /// Build the configured [`ContactStore`].
    pub fn contact_store(&self) -> Result<Arc<dyn ContactStore>, ConfigError> {
        let store: Arc<dyn ContactStore> = match self.storage {
            StorageKind::File => Arc::new(JsonFileStore::new(&self.contacts_file)),
            StorageKind::Memory => Arc::new(MemoryStore::new()),
            StorageKind::Firestore => Arc::new(FirestoreStore::new(self.firestore_config()?)?),
        };
        Ok(store)
    }

    /// Resolve the document store target and its credentials.
    ///
    /// Token source precedence: emulator, `FIREBASE_ACCESS_TOKEN`,
    /// `FIREBASE_CLIENT_EMAIL` + `FIREBASE_PRIVATE_KEY`, the service account JSON,
    /// then the metadata server.
    pub fn firestore_config(&self) -> Result<FirestoreConfig, ConfigError> {
        let account = self.service_account()?;

        let project_id = match non_blank(&self.firebase_project_id) {
            Some(project_id) => project_id.to_string(),
            None => account
                .as_ref()
                .and_then(|(_, account)| account.project_id.clone())
                .ok_or(ConfigError::Missing("FIREBASE_PROJECT_ID"))?,
        };

        let mut config = FirestoreConfig::new(project_id);
        config.collection = self.firestore_collection.clone();

        if let Some(host) = non_blank(&self.firestore_emulator_host) {
            config = config.emulator(host);
        } else if let Some(token) = non_blank(&self.firebase_access_token) {
            config.token = TokenSource::Static(token.to_string());
        } else if let Some(key) = self.service_account_key(account)? {
            config.token = TokenSource::ServiceAccount(key);
        }

        Ok(config)
    }

    fn service_account_key(
        &self,
        account: Option<(&'static str, ServiceAccount)>,
    ) -> Result<Option<ServiceAccountKey>, ConfigError> {
        match (
            non_blank(&self.firebase_client_email),
            non_blank(&self.firebase_private_key),
        ) {
            (Some(email), Some(key)) => {
                return Ok(Some(ServiceAccountKey::new(email, key.replace("\\n", "\n"))))
            }
            (Some(_), None) => return Err(ConfigError::Missing("FIREBASE_PRIVATE_KEY")),
            (None, Some(_)) => return Err(ConfigError::Missing("FIREBASE_CLIENT_EMAIL")),
            (None, None) => {}
        }

        let Some((source, account)) = account else {
            return Ok(None);
        };
        match (account.client_email, account.private_key) {
            (Some(email), Some(key)) => {
                let mut service_account = ServiceAccountKey::new(email, key);
                if let Some(token_uri) = account.token_uri {
                    service_account.token_uri = token_uri;
                }
                Ok(Some(service_account))
            }
            _ => Err(ConfigError::Invalid {
                key: source,
                reason: "service account needs client_email and private_key".into(),
            }),
        }
    }

    fn service_account(&self) -> Result<Option<(&'static str, ServiceAccount)>, ConfigError> {
        let (key, json) = if let Some(blob) = non_blank(&self.firebase_credentials) {
            ("FIREBASE_CREDENTIALS", blob.to_string())
        } else if let Some(path) = &self.google_application_credentials {
            let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
                key: "GOOGLE_APPLICATION_CREDENTIALS",
                reason: format!("{}: {e}", path.display()),
            })?;
            ("GOOGLE_APPLICATION_CREDENTIALS", json)
        } else {
            return Ok(None);
        };

        serde_json::from_str(&json)
            .map(|account| Some((key, account)))
            .map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
    }

    /// Build the configured [`Mailer`] and the sender address notifications use.
    pub fn mailer(&self) -> Result<(Arc<dyn Mailer>, String), ConfigError> {
        let configured_from = non_blank(&self.mail_from).map(str::to_string);

        match self.mail_transport {
            MailTransport::Resend => {
                let api_key = non_blank(&self.resend_api_key)
                    .ok_or(ConfigError::Missing("RESEND_API_KEY"))?;
                let mut config = ResendConfig::new(api_key);
                if let Some(base_url) = non_blank(&self.resend_base_url) {
                    config.base_url = base_url.to_string();
                }
                let mailer: Arc<dyn Mailer> = Arc::new(ResendMailer::from_config(config)?);
                let from = configured_from.unwrap_or_else(|| RESEND_SHARED_SENDER.to_string());
                Ok((mailer, from))
            }
            MailTransport::Smtp => {
                let smtp = SmtpMailer::from_env()?;
                let from = configured_from.unwrap_or_else(|| smtp.sender().to_string());
                let mailer: Arc<dyn Mailer> = Arc::new(smtp);
                Ok((mailer, from))
            }
            MailTransport::Log => {
                let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
                let from = configured_from.unwrap_or_else(|| RESEND_SHARED_SENDER.to_string());
                Ok((mailer, from))
            }
        }
    }

    pub fn recipient(&self) -> Result<&str, ConfigError> {
        non_blank(&self.email_user).ok_or(ConfigError::Missing("EMAIL_USER"))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
