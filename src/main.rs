//! deep-research - Command-line entry point
//!
//! Loads `research.toml`, runs one query through the pipeline and streams its
//! progress to the terminal.

use anyhow::{Context, Result};
use deep_research::cli::output::Output;
use deep_research::cli::Cli;
use deep_research::notify::DisabledTransport;
use deep_research::research::{ChannelObserver, ResearchManager};
use deep_research::tools::DaedraSearch;
use deep_research::utils::ResearchConfig;
use owo_colors::OwoColorize;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let config = ResearchConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config.logging.level, cli.json_logs || config.logging.json)?;

    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let provider = config.to_provider()?;
    tracing::info!(provider = provider.name(), model = provider.model(), "Using LLM provider");
    let llm: Arc<dyn deep_research::LLMClient> = Arc::from(provider.create_client().await?);

    let (observer, mut events) = ChannelObserver::new();
    let mut builder = ResearchManager::builder(llm)
        .settings(config.settings())
        .observer(Arc::new(observer));
    if config.research.web_search {
        builder = builder.web_search(Arc::new(DaedraSearch::new()));
    }
    builder = if cli.no_email {
        builder
            .transport(Arc::new(DisabledTransport))
            .compose_email(false)
    } else {
        builder.transport(config.transport())
    };
    let manager = builder.build();

    output.banner(&cli.query);
    let query = cli.query.clone();
    let pipeline = tokio::spawn(async move { manager.run(&query).await });

    // The channel closes once the manager, and with it the observer, is dropped.
    while let Some(event) = events.recv().await {
        output.event(&event);
    }
    let outcome = pipeline.await.context("Research task aborted")?;

    if let Some(stage) = outcome.failed_stage() {
        anyhow::bail!("research failed during {} (trace {})", stage, outcome.trace_id);
    }
    if let Some(report) = &outcome.report {
        output.report(
            &report.short_summary,
            &report.markdown_report,
            &report.follow_up_questions,
        );
    }

    Ok(())
}

fn init_tracing(default_level: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("Invalid log level '{}'", default_level))?,
    };

    let (json_layer, text_layer) = if json {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (None, Some(fmt::layer().with_writer(std::io::stderr)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}
