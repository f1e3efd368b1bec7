//! Outgoing email.
//!
//! A thin abstraction over the delivery mechanisms the site can use. Every backend
//! implements [`Mailer`] and returns the [`MessageId`] of the delivered message.
//!
//! ```ignore
//! let mailer = ResendMailer::from_config(ResendConfig::new(api_key))?;
//!
//! let email = Email::builder()
//!     .from("onboarding@resend.dev")
//!     .to("owner@example.com")
//!     .subject("Nuevo Mensaje de Contacto ✔")
//!     .html("<p>Hola</p>")
//!     .build()?;
//! let id = mailer.send(&email).await?;
//! ```
//!
//! # Backends
//!
//! | Backend | Transport | Configuration |
//! |---------|-----------|---------------|
//! | [`ResendMailer`] | Resend HTTP API | `RESEND_API_KEY`, `RESEND_BASE_URL` (optional) |
//! | [`SmtpMailer`] | SMTP relay (lettre) | `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM`, `SMTP_TLS`, `SMTP_TIMEOUT` |
//! | [`LogMailer`] | the log | none |

mod mailer;
mod message;
mod resend;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mailer::{LogMailer, Mailer, MailerConfig, SmtpMailer};
pub use message::{Email, EmailBody, EmailBuilder};
pub use resend::{ResendConfig, ResendMailer};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("mail API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail API rejected the message ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Identifier of a delivered message, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        MessageId(id.into())
    }

    /// A fresh `<uuid@domain>` id for backends that do not assign one.
    pub fn generate(domain: &str) -> Self {
        MessageId(format!("<{}@{}>", uuid::Uuid::new_v4(), domain))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Domain part of an address such as `Site <site@example.com>`, for generated ids.
pub(crate) fn address_domain(address: &str) -> &str {
    address
        .rsplit('@')
        .next()
        .filter(|_| address.contains('@'))
        .map(|domain| domain.trim_end_matches('>').trim())
        .filter(|domain| !domain.is_empty())
        .unwrap_or("localhost")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_from_plain_and_named_addresses() {
        assert_eq!(address_domain("site@example.com"), "example.com");
        assert_eq!(address_domain("Site <site@mail.example.com>"), "mail.example.com");
        assert_eq!(address_domain("nobody"), "localhost");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = MessageId::generate("example.com");
        let b = MessageId::generate("example.com");
        assert_ne!(a, b);
        assert!(a.as_str().ends_with("@example.com>"));
    }
}
