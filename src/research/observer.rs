//! Pipeline lifecycle hooks
//!
//! The manager and coordinator report what they are doing through a
//! [`PipelineObserver`] instead of logging from wrappers. The default
//! [`TracingObserver`] turns events into `tracing` records; [`ChannelObserver`]
//! forwards them to a consumer such as a terminal UI.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The stages a run moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Planning,
    Searching,
    Writing,
    Notifying,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Planning => "planning",
            Stage::Searching => "searching",
            Stage::Writing => "writing",
            Stage::Notifying => "notifying",
        };
        f.write_str(name)
    }
}

/// Position of a run in `Init -> Planning -> Searching -> Writing -> Notifying -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Init,
    Planning,
    Searching,
    Writing,
    Notifying,
    Done,
    Failed(Stage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

impl From<Stage> for PipelineState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Planning => PipelineState::Planning,
            Stage::Searching => PipelineState::Searching,
            Stage::Writing => PipelineState::Writing,
            Stage::Notifying => PipelineState::Notifying,
        }
    }
}

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageEntered(Stage),
    StageExited {
        stage: Stage,
        elapsed: Duration,
        succeeded: bool,
    },
    TaskCompleted {
        index: usize,
        term: String,
        succeeded: bool,
        detail: Option<String>,
    },
    /// A line appended to the status log.
    Status(String),
    /// The finished markdown report, appended to the status log as its last entry.
    Report(String),
}

pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Emits every event as a `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageEntered(stage) => info!(%stage, "Stage started"),
            PipelineEvent::StageExited {
                stage,
                elapsed,
                succeeded: true,
            } => info!(%stage, elapsed_ms = elapsed.as_millis() as u64, "Stage finished"),
            PipelineEvent::StageExited { stage, elapsed, .. } => {
                warn!(%stage, elapsed_ms = elapsed.as_millis() as u64, "Stage failed")
            }
            PipelineEvent::TaskCompleted {
                index,
                term,
                succeeded: true,
                ..
            } => info!(task = index + 1, %term, "Search completed"),
            PipelineEvent::TaskCompleted {
                index,
                term,
                detail,
                ..
            } => warn!(
                task = index + 1,
                %term,
                reason = detail.as_deref().unwrap_or("unknown"),
                "Search dropped"
            ),
            PipelineEvent::Status(line) => info!(status = %line),
            PipelineEvent::Report(body) => info!(bytes = body.len(), "Report ready"),
        }
    }
}

/// Forwards events over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PipelineObserver for ChannelObserver {
    fn on_event(&self, event: &PipelineEvent) {
        // A closed receiver only means nobody is listening any more.
        let _ = self.tx.send(event.clone());
    }
}

/// Fans each event out to several observers, in registration order.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: Arc<dyn PipelineObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl PipelineObserver for ObserverSet {
    fn on_event(&self, event: &PipelineEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
