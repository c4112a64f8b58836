//! LLM Provider Clients and Abstractions
//!
//! The research agents only ever see [`LLMClient`]; which backend sits behind
//! it is decided once, from configuration, through [`Provider`].
//!
//! # Supported Providers
//!
//! - `openai` feature - OpenAI-compatible chat completions via async-openai
//! - `ollama` feature - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use deep_research::llm::{ModelParams, Provider};
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//!     params: ModelParams::default(),
//! }
//! .create_client()
//! .await?;
//!
//! let response = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, ModelParams, Provider};
