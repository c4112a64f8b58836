use crate::agents::{invoke_structured, Agent, StructuredError};
use crate::llm::LLMClient;
use crate::types::{AppError, Result, SearchPlan};
use std::sync::Arc;
use tracing::{debug, info};

/// Default number of searches planned per query.
pub const HOW_MANY_SEARCHES: usize = 5;

/// Turns a free-text query into a bounded [`SearchPlan`].
pub struct PlannerAgent {
    llm: Arc<dyn LLMClient>,
    agent: Agent,
    max_searches: usize,
}

impl PlannerAgent {
    pub fn new(llm: Arc<dyn LLMClient>, max_searches: usize) -> Self {
        let instructions = format!(
            "You are a helpful research assistant. Given a query, come up with a set of web \
             searches to perform to best answer the query. Output {} terms to query for.",
            max_searches
        );

        Self {
            llm,
            agent: Agent::new("PlannerAgent", instructions),
            max_searches,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Plan the searches for `query`.
    ///
    /// Tasks with a blank search term are discarded and the plan is cut to
    /// the configured maximum. A reply that does not parse, or that leaves
    /// no usable task, is a [`AppError::Planning`] carrying the raw reply.
    pub async fn plan(&self, query: &str) -> Result<SearchPlan> {
        info!("Creating new web search plan...");

        let output = invoke_structured::<SearchPlan>(
            self.llm.as_ref(),
            &self.agent,
            &format!("Query: {}", query),
        )
        .await
        .map_err(|e| match e {
            StructuredError::Generation(err) => err,
            StructuredError::Malformed { message, raw } => AppError::Planning { message, raw },
        })?;

        let searches: Vec<_> = output
            .value
            .searches
            .into_iter()
            .filter_map(|mut task| {
                task.term = task.term.trim().to_string();
                (!task.term.is_empty()).then_some(task)
            })
            .take(self.max_searches)
            .collect();

        if searches.is_empty() {
            return Err(AppError::Planning {
                message: "plan contains no usable searches".to_string(),
                raw: output.raw,
            });
        }

        let plan = SearchPlan::new(searches);
        info!("Created plan: {}", plan);
        for (idx, search) in plan.iter().enumerate() {
            debug!("Search {}: {}", idx + 1, search);
        }

        Ok(plan)
    }
}
