use crate::agents::Agent;
use crate::llm::LLMClient;
use crate::tools::search::{format_results, WebSearch};
use crate::types::{SearchFailure, SearchOutcome, SearchTask};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

const INSTRUCTIONS: &str = "You are a research assistant. Given a search term, you search the web \
for that term and produce a concise summary of the results. The summary must be 2-3 paragraphs \
and less than 300 words. Capture the main points. Write succinctly; complete sentences and good \
grammar are not required. The summary will be consumed by someone synthesizing a report, so \
capture the essence and ignore any fluff. Do not include any commentary other than the summary \
itself.";

/// Executes a single search task. Implementations never fail; every problem
/// is reported as [`SearchOutcome::Failed`].
#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, task: &SearchTask) -> SearchOutcome;
}

/// Searches the web for a task and summarizes what it finds.
pub struct SearchAgent {
    llm: Arc<dyn LLMClient>,
    agent: Agent,
    web: Option<Arc<dyn WebSearch>>,
    results_per_search: usize,
}

impl SearchAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self {
            llm,
            agent: Agent::new("Search agent", INSTRUCTIONS),
            web: None,
            results_per_search: 5,
        }
    }

    /// Ground summaries in live results from `web`.
    pub fn with_web_search(mut self, web: Arc<dyn WebSearch>, results_per_search: usize) -> Self {
        self.web = Some(web);
        self.results_per_search = results_per_search;
        self
    }

    async fn build_prompt(&self, task: &SearchTask) -> Result<String, SearchFailure> {
        let mut prompt = format!(
            "Search term: {}\nReason for searching: {}",
            task.term, task.reason
        );

        if let Some(web) = &self.web {
            let results = web
                .search(&task.term, self.results_per_search)
                .await
                .map_err(|e| SearchFailure::Backend(e.to_string()))?;
            debug!(
                backend = web.name(),
                term = %task.term,
                hits = results.len(),
                "Web search returned"
            );
            if !results.is_empty() {
                prompt.push_str("\n\nWeb results:\n");
                prompt.push_str(&format_results(&results));
            }
        }

        Ok(prompt)
    }
}

#[async_trait]
impl Searcher for SearchAgent {
    async fn search(&self, task: &SearchTask) -> SearchOutcome {
        let prompt = match self.build_prompt(task).await {
            Ok(prompt) => prompt,
            Err(failure) => {
                warn!(term = %task.term, "Search failed: {}", failure);
                return SearchOutcome::Failed(failure);
            }
        };

        match self
            .llm
            .generate_with_system(self.agent.instructions(), &prompt)
            .await
        {
            Ok(text) if text.trim().is_empty() => SearchOutcome::Failed(SearchFailure::EmptyOutput),
            Ok(text) => SearchOutcome::Summary(text.trim().to_string()),
            Err(e) => {
                warn!(term = %task.term, "Search summary failed: {}", e);
                SearchOutcome::Failed(SearchFailure::Generation(e.to_string()))
            }
        }
    }
}
