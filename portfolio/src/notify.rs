//! Email notification about a new contact submission.

use std::sync::Arc;

use askama::Template;
use lettre::Address;

use crate::contact::NewContact;
use crate::mail::{Email, MailError, Mailer, MessageId};

pub const SUBJECT: &str = "Nuevo Mensaje de Contacto ✔";

/// HTML part. Submitted values are HTML-escaped.
#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactHtml<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactText<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

/// Tells the site owner about a new submission through a [`Mailer`].
#[derive(Clone)]
pub struct ContactNotifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    to: String,
}

impl ContactNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>, to: impl Into<String>) -> Self {
        ContactNotifier {
            mailer,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn mailer_kind(&self) -> &'static str {
        self.mailer.kind()
    }

    /// The owner can reply straight to the visitor when the submitted email is a valid address.
    pub fn notification(&self, contact: &NewContact) -> Result<Email, MailError> {
        let html = ContactHtml {
            name: &contact.name,
            email: &contact.email,
            message: &contact.message,
        }
        .render()
        .map_err(|e| MailError::Build(e.to_string()))?;

        let text = ContactText {
            name: &contact.name,
            email: &contact.email,
            message: &contact.message,
        }
        .render()
        .map_err(|e| MailError::Build(e.to_string()))?;

        let mut builder = Email::builder()
            .from(&self.from)
            .to(&self.to)
            .subject(SUBJECT)
            .text(text)
            .html(html);
        if contact.email.trim().parse::<Address>().is_ok() {
            builder = builder.reply_to(contact.email.trim());
        }
        builder.build()
    }

    pub async fn notify(&self, contact: &NewContact) -> Result<MessageId, MailError> {
        let email = self.notification(contact)?;
        self.mailer.send(&email).await
    }
}
