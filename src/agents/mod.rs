//! Research agents
//!
//! Each agent is a named role with fixed instructions that runs one kind of
//! generation against an [`LLMClient`]:
//!
//! - [`planner::PlannerAgent`] - turns a query into a [`SearchPlan`](crate::types::SearchPlan)
//! - [`search::SearchAgent`] - summarizes one search task
//! - [`writer::WriterAgent`] - synthesizes the final [`ReportData`](crate::types::ReportData)
//! - [`email::EmailAgent`] - renders a report as an HTML email
//!
//! Agents that need typed output go through [`invoke_structured`], which
//! embeds the expected JSON schema in the system prompt and parses the reply.

pub mod email;
pub mod planner;
pub mod search;
pub mod writer;

use crate::llm::LLMClient;
use crate::types::AppError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

pub use email::EmailAgent;
pub use planner::PlannerAgent;
pub use search::{SearchAgent, Searcher};
pub use writer::WriterAgent;

/// A named role plus the instructions it runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    name: String,
    instructions: String,
}

impl Agent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

/// A parsed structured reply together with the text it came from.
#[derive(Debug, Clone)]
pub struct StructuredOutput<T> {
    pub value: T,
    pub raw: String,
}

/// Why a structured invocation produced no value.
#[derive(Debug, thiserror::Error)]
pub enum StructuredError {
    #[error(transparent)]
    Generation(#[from] AppError),

    #[error("output does not match the expected schema: {message}")]
    Malformed { message: String, raw: String },
}

/// Run `agent` on `input` and parse its reply as `T`.
pub async fn invoke_structured<T>(
    llm: &dyn LLMClient,
    agent: &Agent,
    input: &str,
) -> Result<StructuredOutput<T>, StructuredError>
where
    T: DeserializeOwned + JsonSchema,
{
    let system = structured_system_prompt::<T>(agent);
    tracing::debug!(agent = agent.name(), model = llm.model_name(), "Invoking structured agent");

    let raw = llm.generate_with_system(&system, input).await?;
    let value = parse_structured::<T>(&raw).map_err(|message| StructuredError::Malformed {
        message,
        raw: raw.clone(),
    })?;

    Ok(StructuredOutput { value, raw })
}

fn structured_system_prompt<T: JsonSchema>(agent: &Agent) -> String {
    let schema = schemars::schema_for!(T);
    let schema = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());

    format!(
        "{}\n\nRespond with a single JSON object that matches this JSON schema, \
         with no additional commentary:\n{}",
        agent.instructions(),
        schema
    )
}

/// Parse a model reply as JSON, tolerating code fences and surrounding prose.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let candidate = extract_json_object(raw).ok_or_else(|| "no JSON object found".to_string())?;
    serde_json::from_str(candidate).map_err(|e| e.to_string())
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
