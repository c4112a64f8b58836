//! Web search backend used by the search agent
//!
//! The default backend is daedra, which queries DuckDuckGo.

use crate::types::{AppError, Result, WebResult};
use async_trait::async_trait;

/// Anything that can turn a search term into a list of web hits.
#[async_trait]
pub trait WebSearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<WebResult>>;
}

/// Web search powered by daedra
pub struct DaedraSearch;

impl DaedraSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DaedraSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebSearch for DaedraSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<WebResult>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Empty search query".to_string()));
        }

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: limit,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .take(limit)
            .map(|r| WebResult {
                title: r.title.to_string(),
                url: r.url.to_string(),
                description: r.description.to_string(),
            })
            .collect())
    }
}

/// Render hits as a numbered list for inclusion in a prompt.
pub fn format_results(results: &[WebResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {} ({})\n   {}", i + 1, r.title, r.url, r.description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_empty_query() {
        let backend = DaedraSearch::new();
        let result = backend.search("   ", 5).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_format_results() {
        let results = vec![
            WebResult {
                title: "Study A".into(),
                url: "https://a.example".into(),
                description: "Remote work raised output".into(),
            },
            WebResult {
                title: "Study B".into(),
                url: "https://b.example".into(),
                description: "Mixed evidence".into(),
            },
        ];
        let text = format_results(&results);
        assert!(text.starts_with("1. Study A (https://a.example)"));
        assert!(text.contains("2. Study B (https://b.example)\n   Mixed evidence"));
    }

    #[test]
    fn test_format_results_empty() {
        assert_eq!(format_results(&[]), "");
    }
}
