use crate::agents::{invoke_structured, Agent, StructuredError};
use crate::llm::LLMClient;
use crate::notify::EmailRequest;
use crate::types::ReportData;
use std::sync::Arc;

const INSTRUCTIONS: &str = "You are able to send a nicely formatted HTML email based on a \
detailed report. You will be provided with a detailed report. Convert it into clean, well \
presented HTML and pick an appropriate subject line for a single email.";

/// Renders a report as an email with a subject line and HTML body.
pub struct EmailAgent {
    llm: Arc<dyn LLMClient>,
    agent: Agent,
}

impl EmailAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self {
            llm,
            agent: Agent::new("Email agent", INSTRUCTIONS),
        }
    }

    pub async fn compose(&self, report: &ReportData) -> Result<EmailRequest, StructuredError> {
        invoke_structured::<EmailRequest>(self.llm.as_ref(), &self.agent, &report.markdown_report)
            .await
            .map(|output| output.value)
    }
}
