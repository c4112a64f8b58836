//! # deep-research - Multi-stage research pipeline
//!
//! Given a query, deep-research plans a bounded set of web searches, runs them
//! concurrently, synthesizes the surviving summaries into a structured report
//! and delivers that report by email, streaming human-readable progress the
//! whole way through.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use deep_research::{Provider, ResearchManager};
//! use deep_research::tools::DaedraSearch;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Provider::Ollama {
//!         base_url: "http://localhost:11434".to_string(),
//!         model: "llama3.2:3b".to_string(),
//!         params: Default::default(),
//!     };
//!     let llm = Arc::from(provider.create_client().await?);
//!
//!     let manager = ResearchManager::builder(llm)
//!         .web_search(Arc::new(DaedraSearch::new()))
//!         .build();
//!
//!     let outcome = manager.run("impact of remote work on productivity").await;
//!     for line in outcome.statuses.entries() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI-compatible chat completions via async-openai (default) |
//!
//! ## Modules
//!
//! - [`agents`] - Planner, search, writer and email agents
//! - [`llm`] - LLM client implementations
//! - [`notify`] - Report delivery and mail transports
//! - [`research`] - Fan-out coordinator, pipeline manager and observers
//! - [`tools`] - Web search backends
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Research agents built on an LLM client.
pub mod agents;
/// Command-line parsing and terminal output.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Email delivery of finished reports.
pub mod notify;
/// Research pipeline orchestration.
pub mod research;
/// Web search backends.
pub mod tools;
/// Core types (plans, reports, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use llm::{LLMClient, Provider};
pub use research::{ResearchManager, RunOutcome, StatusLog};
pub use types::{AppError, Result};
pub use utils::ResearchConfig;
