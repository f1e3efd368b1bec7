//! Mailer trait, SMTP relay and log backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use super::{address_domain, Email, EmailBody, MailError, MessageId};

/// Async email delivery.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Deliver one message and return the id it was sent under.
    async fn send(&self, email: &Email) -> Result<MessageId, MailError>;

    /// Short backend name used in logs.
    fn kind(&self) -> &'static str;
}

/// Configuration for [`SmtpMailer`].
#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    #[serde(rename = "smtp_host")]
    pub host: String,

    /// Default 587.
    #[serde(rename = "smtp_port", default = "default_port")]
    pub port: u16,

    #[serde(rename = "smtp_username")]
    pub username: Option<String>,

    #[serde(rename = "smtp_password")]
    pub password: Option<String>,

    /// Sender used when a message has no `from` of its own.
    #[serde(rename = "smtp_from")]
    pub from: String,

    /// `starttls` (default), `tls` or `none`.
    #[serde(rename = "smtp_tls", default = "default_tls")]
    pub tls: String,

    /// Connection timeout in seconds (default 10).
    #[serde(rename = "smtp_timeout", default = "default_timeout")]
    pub timeout: u64,
}

fn default_port() -> u16 {
    587
}

fn default_tls() -> String {
    "starttls".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// Authenticated SMTP relay delivery through lettre.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Reads `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM`,
    /// `SMTP_TLS` and `SMTP_TIMEOUT`.
    pub fn from_env() -> Result<Self, MailError> {
        let config: MailerConfig =
            serde_env::from_env().map_err(|e| MailError::MissingConfig(e.to_string()))?;

        Self::from_config(config)
    }

    pub fn from_config(config: MailerConfig) -> Result<Self, MailError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| MailError::InvalidAddress(config.from.clone()))?;

        let mut builder = match config.tls.as_str() {
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            "starttls" => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            other => {
                return Err(MailError::MissingConfig(format!(
                    "smtp_tls must be starttls, tls or none (got {other})"
                )))
            }
        };

        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout)));

        if let (Some(username), Some(password)) = (config.username, config.password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: Arc::new(builder.build()),
            from,
        })
    }

    /// Sender used for messages without a `from` of their own.
    pub fn sender(&self) -> &Mailbox {
        &self.from
    }

    fn build_message(&self, email: &Email, message_id: &MessageId) -> Result<Message, MailError> {
        let from: Mailbox = match email.from.trim() {
            "" => self.from.clone(),
            from => from
                .parse()
                .map_err(|_| MailError::InvalidAddress(email.from.clone()))?,
        };

        let mut builder = Message::builder()
            .from(from)
            .message_id(Some(message_id.to_string()))
            .subject(&email.subject);

        for to in &email.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        let message = match &email.body {
            EmailBody::Text(text) => builder.body(text.clone()),
            EmailBody::Html(html) => builder.singlepart(SinglePart::html(html.clone())),
            EmailBody::Multipart { text, html } => builder
                .multipart(MultiPart::alternative_plain_html(text.clone(), html.clone())),
        };

        message.map_err(|e| MailError::Build(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<MessageId, MailError> {
        let message_id = MessageId::generate(self.from.email.domain());
        let message = self.build_message(email, &message_id)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        Ok(message_id)
    }

    fn kind(&self) -> &'static str {
        "smtp"
    }
}

/// Writes messages to the log instead of delivering them. Development only.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<MessageId, MailError> {
        let id = MessageId::generate(address_domain(&email.from));
        tracing::info!(
            message_id = %id,
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            "email not delivered (log mailer)"
        );
        tracing::debug!(body = ?email.body, "log mailer body");
        Ok(id)
    }

    fn kind(&self) -> &'static str {
        "log"
    }
}
