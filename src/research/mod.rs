//! Research pipeline
//!
//! A run moves one query through four stages:
//!
//! - Planning: [`PlannerAgent`](crate::agents::PlannerAgent) produces a bounded [`SearchPlan`](crate::types::SearchPlan)
//! - Searching: [`coordinator::ResearchCoordinator`] runs every task concurrently and keeps the summaries that succeed
//! - Writing: [`WriterAgent`](crate::agents::WriterAgent) synthesizes a [`ReportData`](crate::types::ReportData)
//! - Notifying: [`Notifier`](crate::notify::Notifier) makes one best-effort delivery attempt
//!
//! [`manager::ResearchManager`] sequences the stages and records an ordered
//! status log; observers in [`observer`] see the same progress as it happens.
//!
//! # Usage
//!
//! ```ignore
//! use deep_research::research::ResearchManager;
//!
//! let manager = ResearchManager::builder(llm).web_search(web).build();
//! let outcome = manager
//!     .run("What are the latest developments in quantum computing?")
//!     .await;
//!
//! for line in outcome.statuses.entries() {
//!     println!("{}", line);
//! }
//! ```

pub mod coordinator;
pub mod manager;
pub mod observer;

pub use coordinator::ResearchCoordinator;
pub use manager::{ResearchManager, ResearchManagerBuilder, ResearchSettings, RunOutcome, StatusLog};
pub use observer::{
    ChannelObserver, ObserverSet, PipelineEvent, PipelineObserver, PipelineState, Stage,
    TracingObserver,
};
