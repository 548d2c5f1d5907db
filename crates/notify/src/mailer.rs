//! Outbound mail dispatch.
//!
//! The notifier only ever hands a finished `{to, subject, html_body}` to a
//! `Mailer`; delivery outcome is observed through logs, never awaited by the
//! request path.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::MailError;
use taskdeck_config::MailConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// Mailer backed by an HTTP mail API.
pub struct HttpMailer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": email.to,
            "subject": email.subject,
            "html": email.html_body,
        });

        let mut request = self.client.post(format!("{}/messages", self.base_url)).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|error| MailError::Request(error.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}

/// Mailer used when no mail API is configured: drops everything with a log
/// line so the rest of the fan-out still behaves normally.
pub struct NullMailer;

#[async_trait]
impl Mailer for NullMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        debug!(to = %email.to, subject = %email.subject, "mail delivery disabled, dropping email");
        Ok(())
    }
}
