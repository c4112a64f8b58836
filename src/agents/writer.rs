use crate::agents::{invoke_structured, Agent, StructuredError};
use crate::llm::LLMClient;
use crate::types::{AppError, ReportData, Result};
use std::sync::Arc;
use tracing::info;

const INSTRUCTIONS: &str = "You are a senior researcher tasked with writing a cohesive report \
for a research query. You will be provided with the original query and some initial research \
done by a research assistant. First come up with an outline for the report that describes its \
structure and flow. Then write the report and return it as your final output. The report should \
be in markdown format, detailed and lengthy: aim for 5-10 pages of content, at least 1000 words. \
If the research is empty, say plainly that no information was found and suggest how the \
question could be narrowed.";

/// Synthesizes the query and collected summaries into a [`ReportData`].
pub struct WriterAgent {
    llm: Arc<dyn LLMClient>,
    agent: Agent,
}

impl WriterAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self {
            llm,
            agent: Agent::new("WriterAgent", INSTRUCTIONS),
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Write the report. Runs even when `summaries` is empty.
    pub async fn write(&self, query: &str, summaries: &[String]) -> Result<ReportData> {
        info!(summaries = summaries.len(), "Writing report...");
        let prompt = format!(
            "Original query: {}\nSummarized search results: {:?}",
            query, summaries
        );

        let output = invoke_structured::<ReportData>(self.llm.as_ref(), &self.agent, &prompt)
            .await
            .map_err(|e| match e {
                StructuredError::Generation(err) => err,
                StructuredError::Malformed { message, raw } => {
                    AppError::Synthesis { message, raw }
                }
            })?;

        if output.value.markdown_report.trim().is_empty() {
            return Err(AppError::Synthesis {
                message: "report body is empty".to_string(),
                raw: output.raw,
            });
        }

        info!("Finished writing report");
        Ok(output.value)
    }
}
