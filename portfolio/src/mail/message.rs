//! Email message types and builder.

use serde::{Deserialize, Serialize};

use super::MailError;

/// The body content of an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailBody {
    Text(String),
    Html(String),
    /// Both parts, sent as multipart/alternative.
    Multipart { text: String, html: String },
}

impl EmailBody {
    pub fn text(&self) -> Option<&str> {
        match self {
            EmailBody::Text(text) | EmailBody::Multipart { text, .. } => Some(text),
            EmailBody::Html(_) => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            EmailBody::Html(html) | EmailBody::Multipart { html, .. } => Some(html),
            EmailBody::Text(_) => None,
        }
    }
}

/// A complete email message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: EmailBody,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }
}

/// Builder for [`Email`]; `build` checks that sender, recipient, subject and body are set.
#[derive(Debug, Default)]
pub struct EmailBuilder {
    from: Option<String>,
    to: Vec<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
}

impl EmailBuilder {
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn build(self) -> Result<Email, MailError> {
        let from = self
            .from
            .filter(|from| !from.trim().is_empty())
            .ok_or_else(|| MailError::Build("from address required".into()))?;

        if self.to.iter().all(|to| to.trim().is_empty()) {
            return Err(MailError::Build("at least one recipient required".into()));
        }

        let subject = self
            .subject
            .ok_or_else(|| MailError::Build("subject required".into()))?;

        let body = match (self.text, self.html) {
            (Some(text), Some(html)) => EmailBody::Multipart { text, html },
            (Some(text), None) => EmailBody::Text(text),
            (None, Some(html)) => EmailBody::Html(html),
            (None, None) => return Err(MailError::Build("body required (text or html)".into())),
        };

        Ok(Email {
            from,
            to: self.to,
            reply_to: self.reply_to,
            subject,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> EmailBuilder {
        Email::builder()
            .from("onboarding@resend.dev")
            .to("owner@example.com")
            .subject("Nuevo Mensaje de Contacto ✔")
    }

    #[test]
    fn html_only_email() {
        let email = base().html("<p>Hola</p>").build().unwrap();

        assert_eq!(email.from, "onboarding@resend.dev");
        assert_eq!(email.to, vec!["owner@example.com"]);
        assert_eq!(email.body.html(), Some("<p>Hola</p>"));
        assert_eq!(email.body.text(), None);
    }

    #[test]
    fn text_and_html_become_multipart() {
        let email = base().text("Hola").html("<p>Hola</p>").build().unwrap();

        assert!(matches!(email.body, EmailBody::Multipart { .. }));
        assert_eq!(email.body.text(), Some("Hola"));
        assert_eq!(email.body.html(), Some("<p>Hola</p>"));
    }

    #[test]
    fn blank_sender_or_recipient_is_rejected() {
        let result = Email::builder().from(" ").to("a@b.com").subject("Hi").text("x").build();
        assert!(matches!(result, Err(MailError::Build(_))));

        let result = Email::builder().from("a@b.com").to("").subject("Hi").text("x").build();
        assert!(matches!(result, Err(MailError::Build(_))));
    }

    #[test]
    fn reply_to_is_optional() {
        let email = base().text("Hola").build().unwrap();
        assert_eq!(email.reply_to, None);

        let email = base().reply_to("ana@x.com").text("Hola").build().unwrap();
        assert_eq!(email.reply_to.as_deref(), Some("ana@x.com"));
    }

    #[test]
    fn subject_and_body_are_required() {
        let result = Email::builder().from("a@b.com").to("a@b.com").text("x").build();
        assert!(result.is_err());

        let result = base().build();
        assert!(result.is_err());
    }
}
