//! Colored output helpers for CLI
//!
//! Renders pipeline progress and the final report for the deep-research CLI.

use crate::research::observer::{PipelineEvent, Stage};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the query being researched
    pub fn banner(&self, query: &str) {
        if self.colored {
            println!(
                "\n  {} {}",
                "deep-research".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
            println!("  {} {}\n", "Query:".dimmed(), query.bright_white().bold());
        } else {
            println!("\n  deep-research v{}", env!("CARGO_PKG_VERSION"));
            println!("  Query: {}\n", query);
        }
    }

    /// Print one pipeline event as it arrives.
    ///
    /// Every status line is printed. The report event is skipped since
    /// [`Output::report`] prints the finished report separately.
    pub fn event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageEntered(stage) => self.stage(*stage),
            PipelineEvent::TaskCompleted {
                index,
                term,
                succeeded,
                detail,
            } => self.task(*index, term, *succeeded, detail.as_deref()),
            PipelineEvent::Status(line) => self.status(line),
            // Rendered in full by `report` once the run returns.
            PipelineEvent::Report(_) | PipelineEvent::StageExited { .. } => {}
        }
    }

    /// Print a stage heading
    pub fn stage(&self, stage: Stage) {
        let title = match stage {
            Stage::Planning => "Planning",
            Stage::Searching => "Searching",
            Stage::Writing => "Writing",
            Stage::Notifying => "Notifying",
        };
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a status log entry
    pub fn status(&self, message: &str) {
        if message.starts_with("Research failed") {
            self.error(message);
        } else if message.starts_with("Email not sent") || message.starts_with("No search") {
            self.warning(message);
        } else {
            self.info(message);
        }
    }

    /// Print the result of one search task
    pub fn task(&self, index: usize, term: &str, succeeded: bool, detail: Option<&str>) {
        let label = format!("[{}]", index + 1);
        match (succeeded, self.colored) {
            (true, true) => println!("    {} {} {}", "✓".green(), label.dimmed(), term),
            (true, false) => println!("    [OK] {} {}", label, term),
            (false, true) => println!(
                "    {} {} {} {}",
                "✗".red(),
                label.dimmed(),
                term,
                format!("({})", detail.unwrap_or("failed")).red()
            ),
            (false, false) => println!(
                "    [FAILED] {} {} ({})",
                label,
                term,
                detail.unwrap_or("failed")
            ),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print the finished report followed by its follow-up questions
    pub fn report(&self, summary: &str, markdown: &str, follow_ups: &[String]) {
        self.header("Summary");
        println!("\n{}\n", summary.trim());
        self.header("Report");
        println!("\n{}\n", markdown.trim_end());

        if !follow_ups.is_empty() {
            self.header("Follow-up questions");
            for question in follow_ups {
                if self.colored {
                    println!("    {} {}", "•".blue(), question);
                } else {
                    println!("    - {}", question);
                }
            }
            println!();
        }
    }
}
