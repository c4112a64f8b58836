//! CLI module for deep-research
//!
//! Provides command-line interface parsing for the deep-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::Parser;
use std::path::PathBuf;

/// deep-research - plan, search, write and deliver a research report
#[derive(Parser, Debug)]
#[command(
    name = "deep-research",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Research a query with concurrent web searches and an LLM-written report",
    after_help = "EXAMPLES:\n    \
                  deep-research \"impact of remote work on productivity\"\n    \
                  deep-research --no-email \"state of solid-state batteries\"\n    \
                  deep-research --config my.toml --json-logs \"rust async runtimes\""
)]
pub struct Cli {
    /// The question to research
    pub query: String,

    /// Path to the configuration file
    #[arg(short, long, default_value = "research.toml", env = "DEEP_RESEARCH_CONFIG")]
    pub config: PathBuf,

    /// Do not send the report by email
    #[arg(long)]
    pub no_email: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
