//! Built-in Tools for the Research Agents
//!
//! # Module Structure
//!
//! - [`search`](crate::tools::search) - Web search integration (DuckDuckGo via daedra)
//!
//! The search agent calls a [`search::WebSearch`] backend before summarizing,
//! so its summary is grounded in live results rather than model memory:
//! ```ignore
//! let hits = DaedraSearch::new().search("rust async runtimes", 5).await?;
//! for hit in hits {
//!     println!("{}: {}", hit.title, hit.url);
//! }
//! ```

/// Web search backends.
pub mod search;

pub use search::{DaedraSearch, WebSearch};
