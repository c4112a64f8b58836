use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============= Planning Types =============

/// A single web search the planner wants performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchTask {
    /// Your reasoning for why this search is important to the query.
    #[serde(default)]
    pub reason: String,
    /// The search term to use for the web search.
    #[serde(rename = "query")]
    pub term: String,
}

impl SearchTask {
    pub fn new(term: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SearchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Search: '{}' - Reason: {}", self.term, self.reason)
    }
}

/// Ordered list of searches produced once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchPlan {
    /// A list of web searches to perform to best answer the query.
    pub searches: Vec<SearchTask>,
}

impl SearchPlan {
    pub fn new(searches: Vec<SearchTask>) -> Self {
        Self { searches }
    }

    pub fn len(&self) -> usize {
        self.searches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchTask> {
        self.searches.iter()
    }
}

impl fmt::Display for SearchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Web search plan with {} searches", self.searches.len())
    }
}

// ============= Search Types =============

/// Result of executing one [`SearchTask`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Summary(String),
    Failed(SearchFailure),
}

impl SearchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SearchOutcome::Summary(_))
    }

    /// Consume the outcome, keeping only a successful summary.
    pub fn into_summary(self) -> Option<String> {
        match self {
            SearchOutcome::Summary(text) => Some(text),
            SearchOutcome::Failed(_) => None,
        }
    }
}

/// Why a single search produced no summary. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchFailure {
    #[error("web search backend failed: {0}")]
    Backend(String),

    #[error("summary generation failed: {0}")]
    Generation(String),

    #[error("summary was empty")]
    EmptyOutput,

    #[error("search timed out after {0:?}")]
    TimedOut(Duration),

    #[error("search task aborted: {0}")]
    Aborted(String),
}

/// A single hit returned by a web search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub description: String,
}

// ============= Report Types =============

/// Final structured report written from the collected summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportData {
    /// A short 2-3 sentence summary of the findings.
    pub short_summary: String,
    /// The final report, in markdown.
    pub markdown_report: String,
    /// Suggested topics to research further.
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

// ============= Delivery Types =============

/// Outcome of handing a report to the notification channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryResult {
    Delivered,
    Rejected(DeliveryFailure),
}

impl DeliveryResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered)
    }
}

/// Why a report was not delivered. Logged, never fatal to a run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeliveryFailure {
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("missing credentials: environment variable '{0}' is not set")]
    MissingCredentials(String),

    #[error("mail API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("notification channel is disabled")]
    Disabled,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Planning error: {message}")]
    Planning { message: String, raw: String },

    #[error("Synthesis error: {message}")]
    Synthesis { message: String, raw: String },

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// The raw generation output that failed to parse, when there is one.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            AppError::Planning { raw, .. } | AppError::Synthesis { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
