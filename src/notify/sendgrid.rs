//! SendGrid v3 mail transport

use crate::notify::{EmailRequest, MailTransport};
use crate::types::DeliveryFailure;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error};

pub const DEFAULT_SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// Sends mail through the SendGrid HTTP API.
///
/// The API key is resolved when the transport is built; a missing key does
/// not prevent construction, it makes every send come back as
/// [`DeliveryFailure::MissingCredentials`].
pub struct SendGridTransport {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    api_key_env: String,
    from: String,
    to: String,
}

impl SendGridTransport {
    pub fn new(api_key: Option<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_SENDGRID_API_BASE.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_env: "SENDGRID_API_KEY".to_string(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Read the API key from `api_key_env`.
    pub fn from_env(api_key_env: &str, from: impl Into<String>, to: impl Into<String>) -> Self {
        let mut transport = Self::new(std::env::var(api_key_env).ok(), from, to);
        transport.api_key_env = api_key_env.to_string();
        transport
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl MailTransport for SendGridTransport {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, email: &EmailRequest) -> Result<(), DeliveryFailure> {
        let Some(api_key) = &self.api_key else {
            error!("{} not configured in environment", self.api_key_env);
            return Err(DeliveryFailure::MissingCredentials(self.api_key_env.clone()));
        };

        let body = json!({
            "personalizations": [{ "to": [{ "email": self.to }] }],
            "from": { "email": self.from },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.html_body }]
        });

        debug!(to = %self.to, "Sending email via SendGrid");
        let response = self
            .http
            .post(format!("{}/v3/mail/send", self.api_base))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryFailure::Transport(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "SendGrid response");
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            error!("Failed to send email, response body: {}", body);
            Err(DeliveryFailure::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
