//! Report delivery
//!
//! The [`Notifier`] turns a finished report into an email and hands it to a
//! [`MailTransport`]. Delivery is best effort: every problem comes back as
//! [`DeliveryResult::Rejected`], never as an error.

pub mod sendgrid;

use crate::agents::EmailAgent;
use crate::types::{DeliveryFailure, DeliveryResult, ReportData};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub use sendgrid::SendGridTransport;

const MAX_SUBJECT_CHARS: usize = 120;

/// A ready-to-send email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EmailRequest {
    /// Email subject line
    pub subject: String,
    /// HTML content of the email
    pub html_body: String,
}

impl EmailRequest {
    /// Deterministic rendering used when the email agent is unavailable.
    pub fn from_report(report: &ReportData) -> Self {
        let subject = report
            .short_summary
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|line| line.chars().take(MAX_SUBJECT_CHARS).collect())
            .unwrap_or_else(|| "Research report".to_string());

        Self {
            subject,
            html_body: markdown_to_html(&report.markdown_report),
        }
    }

    pub fn validate(&self) -> Result<(), DeliveryFailure> {
        if self.subject.trim().is_empty() {
            return Err(DeliveryFailure::InvalidMessage("subject is empty".to_string()));
        }
        if self.html_body.trim().is_empty() {
            return Err(DeliveryFailure::InvalidMessage("body is empty".to_string()));
        }
        Ok(())
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Something that can send one email.
#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, email: &EmailRequest) -> Result<(), DeliveryFailure>;
}

/// Transport used when no notification channel is configured.
pub struct DisabledTransport;

#[async_trait]
impl MailTransport for DisabledTransport {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn send(&self, _email: &EmailRequest) -> Result<(), DeliveryFailure> {
        Err(DeliveryFailure::Disabled)
    }
}

/// Delivers reports through a [`MailTransport`].
pub struct Notifier {
    composer: Option<EmailAgent>,
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            composer: None,
            transport,
        }
    }

    /// Let an email agent format the HTML, falling back to plain rendering.
    pub fn with_composer(mut self, composer: EmailAgent) -> Self {
        self.composer = Some(composer);
        self
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Make exactly one delivery attempt for `report`.
    pub async fn notify(&self, report: &ReportData) -> DeliveryResult {
        let email = self.compose(report).await;

        if let Err(failure) = email.validate() {
            warn!("Invalid email request: {}", failure);
            return DeliveryResult::Rejected(failure);
        }
        info!(transport = self.transport.name(), subject = %email.subject, "Sending email");

        match self.transport.send(&email).await {
            Ok(()) => {
                info!("Email sent");
                DeliveryResult::Delivered
            }
            Err(failure) => {
                warn!(transport = self.transport.name(), "Email not delivered: {}", failure);
                DeliveryResult::Rejected(failure)
            }
        }
    }

    async fn compose(&self, report: &ReportData) -> EmailRequest {
        let fallback = || EmailRequest::from_report(report);
        let Some(composer) = &self.composer else {
            return fallback();
        };

        match composer.compose(report).await {
            Ok(email) if email.validate().is_ok() => email,
            Ok(_) => {
                warn!("Email agent returned an incomplete email, using plain rendering");
                fallback()
            }
            Err(e) => {
                warn!("Email agent failed ({}), using plain rendering", e);
                fallback()
            }
        }
    }
}
