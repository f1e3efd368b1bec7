//! Delivery through the Resend transactional email API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Email, MailError, Mailer, MessageId};

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    /// API root, overridable for testing.
    pub base_url: String,
}

impl ResendConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        ResendConfig {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl<'a> From<&'a Email> for SendRequest<'a> {
    fn from(email: &'a Email) -> Self {
        SendRequest {
            from: &email.from,
            to: &email.to,
            reply_to: email.reply_to.as_deref(),
            subject: &email.subject,
            html: email.body.html(),
            text: email.body.text(),
        }
    }
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// HTTP API mailer for Resend.
#[derive(Clone)]
pub struct ResendMailer {
    http: reqwest::Client,
    emails_url: String,
    api_key: String,
}

impl ResendMailer {
    pub fn from_config(config: ResendConfig) -> Result<Self, MailError> {
        if config.api_key.trim().is_empty() {
            return Err(MailError::MissingConfig("resend_api_key".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(ResendMailer {
            http,
            emails_url: format!("{}/emails", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &Email) -> Result<MessageId, MailError> {
        let response = self
            .http
            .post(&self.emails_url)
            .bearer_auth(&self.api_key)
            .json(&SendRequest::from(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(MailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = response.json().await?;
        Ok(MessageId::new(sent.id))
    }

    fn kind(&self) -> &'static str {
        "resend"
    }
}
