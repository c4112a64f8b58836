//! Mock implementations for testing.
//!
//! Scripted LLM clients and transports shared by the integration tests, so
//! pipeline runs can be exercised without a model server or the network.

use async_trait::async_trait;
use deep_research::llm::LLMClient;
use deep_research::notify::{EmailRequest, MailTransport};
use deep_research::types::{AppError, DeliveryFailure, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Which agent a request came from, recognised by its instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Planner,
    Searcher,
    Writer,
    Email,
}

impl Role {
    fn of(system: &str) -> Option<Self> {
        if system.starts_with("You are a helpful research assistant") {
            Some(Role::Planner)
        } else if system.starts_with("You are a research assistant") {
            Some(Role::Searcher)
        } else if system.starts_with("You are a senior researcher") {
            Some(Role::Writer)
        } else if system.starts_with("You are able to send") {
            Some(Role::Email)
        } else {
            None
        }
    }
}

/// LLM client that answers each agent with a scripted reply.
///
/// Search requests succeed with `summary: <term>` unless the term was marked
/// as failing. Every prompt is recorded with the role that sent it.
pub struct ScriptedLLMClient {
    plan: std::result::Result<String, String>,
    report: std::result::Result<String, String>,
    email: std::result::Result<String, String>,
    failing_terms: HashSet<String>,
    prompts: Mutex<Vec<(Role, String)>>,
}

impl ScriptedLLMClient {
    pub fn new() -> Self {
        Self {
            plan: Ok(plan_json(&["one", "two", "three"])),
            report: Ok(report_json("Short summary.", "# Report\n\nFindings.")),
            email: Err("email agent not scripted".to_string()),
            failing_terms: HashSet::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_plan(mut self, reply: impl Into<String>) -> Self {
        self.plan = Ok(reply.into());
        self
    }

    /// Make the planner's generation call fail.
    pub fn with_plan_error(mut self, message: &str) -> Self {
        self.plan = Err(message.to_string());
        self
    }

    pub fn with_report(mut self, reply: impl Into<String>) -> Self {
        self.report = Ok(reply.into());
        self
    }

    pub fn with_email(mut self, reply: impl Into<String>) -> Self {
        self.email = Ok(reply.into());
        self
    }

    /// Make the search for `term` fail with a generation error.
    pub fn failing_search(mut self, term: &str) -> Self {
        self.failing_terms.insert(term.to_string());
        self
    }

    pub fn prompts_for(&self, role: Role) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }

    pub fn calls(&self, role: Role) -> usize {
        self.prompts_for(role).len()
    }

    fn search_reply(&self, prompt: &str) -> Result<String> {
        let term = prompt
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("Search term: "))
            .unwrap_or_default();
        if self.failing_terms.contains(term) {
            Err(AppError::LLM(format!("scripted failure for '{}'", term)))
        } else {
            Ok(format!("summary: {}", term))
        }
    }
}

impl Default for ScriptedLLMClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let Some(role) = Role::of(system) else {
            return Err(AppError::LLM("unrecognised agent".to_string()));
        };
        self.prompts
            .lock()
            .unwrap()
            .push((role, prompt.to_string()));

        let scripted = match role {
            Role::Planner => &self.plan,
            Role::Searcher => return self.search_reply(prompt),
            Role::Writer => &self.report,
            Role::Email => &self.email,
        };
        scripted.clone().map_err(AppError::LLM)
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Transport that records every email and answers with a fixed result.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<EmailRequest>>,
    reject_with: Option<DeliveryFailure>,
    attempts: AtomicUsize,
}

impl RecordingTransport {
    pub fn rejecting(failure: DeliveryFailure) -> Self {
        Self {
            reject_with: Some(failure),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, email: &EmailRequest) -> std::result::Result<(), DeliveryFailure> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(email.clone());
        match &self.reject_with {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

/// A planner reply with one task per term.
pub fn plan_json(terms: &[&str]) -> String {
    let searches: Vec<_> = terms
        .iter()
        .map(|term| serde_json::json!({"reason": format!("why {}", term), "query": term}))
        .collect();
    serde_json::json!({ "searches": searches }).to_string()
}

/// A writer reply.
pub fn report_json(summary: &str, markdown: &str) -> String {
    serde_json::json!({
        "short_summary": summary,
        "markdown_report": markdown,
        "follow_up_questions": ["What next?"]
    })
    .to_string()
}
