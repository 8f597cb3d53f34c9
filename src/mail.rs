//! Outbound email.
//!
//! Mail goes out through the [`Mailer`] trait. [`HttpMailer`] hands messages to
//! an HTTP mail relay; [`LogMailer`] only logs them and is used when no relay
//! is configured.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::text::sanitize_for_logging;

/// A single plain-text email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub sender: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Logs each message instead of delivering it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        info!(
            "Mail relay not configured; would send '{}' from {} to {:?}: {}",
            message.subject,
            message.sender,
            message.to,
            sanitize_for_logging(&message.body, 200)
        );
        Ok(())
    }
}

/// Posts messages as JSON to a mail relay endpoint.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpMailer {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        HttpMailer {
            client: Client::new(),
            url: url.into(),
            token,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        debug!("Sending mail to {:?} via {}", message.to, self.url);

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            info!("Mail relay accepted message to {:?}", message.to);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailError::Rejected {
            status: status.as_u16(),
            body: sanitize_for_logging(&body, 500),
        })
    }
}
