use crate::agents::{EmailAgent, PlannerAgent, SearchAgent, Searcher, WriterAgent};
use crate::llm::LLMClient;
use crate::notify::{DisabledTransport, MailTransport, Notifier};
use crate::research::coordinator::ResearchCoordinator;
use crate::research::observer::{
    ObserverSet, PipelineEvent, PipelineObserver, PipelineState, Stage, TracingObserver,
};
use crate::tools::search::WebSearch;
use crate::types::{AppError, DeliveryResult, ReportData, SearchPlan};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Tunables for one research pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchSettings {
    pub max_searches: usize,
    pub search_timeout: Option<Duration>,
    pub results_per_search: usize,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_searches: crate::agents::planner::HOW_MANY_SEARCHES,
            search_timeout: None,
            results_per_search: 5,
        }
    }
}

/// Ordered, append-only list of human-readable progress lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLog {
    entries: Vec<String>,
}

impl StatusLog {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.entries
    }

    fn push(&mut self, entry: String) {
        self.entries.push(entry);
    }
}

/// Everything a run produced, whether or not it reached `Done`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub trace_id: Uuid,
    pub state: PipelineState,
    pub statuses: StatusLog,
    pub plan: Option<SearchPlan>,
    pub summaries: Vec<String>,
    pub report: Option<ReportData>,
    pub delivery: Option<DeliveryResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    pub fn is_done(&self) -> bool {
        self.state == PipelineState::Done
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        match self.state {
            PipelineState::Failed(stage) => Some(stage),
            _ => None,
        }
    }
}

/// Drives one query through planning, searching, writing and delivery.
pub struct ResearchManager {
    planner: PlannerAgent,
    coordinator: ResearchCoordinator,
    writer: WriterAgent,
    notifier: Notifier,
    observers: Arc<ObserverSet>,
}

impl ResearchManager {
    pub fn builder(llm: Arc<dyn LLMClient>) -> ResearchManagerBuilder {
        ResearchManagerBuilder::new(llm)
    }

    /// Run the deep research process, collecting status messages and the final report.
    pub async fn run(&self, query: &str) -> RunOutcome {
        let trace_id = Uuid::new_v4();
        let span = tracing::info_span!("research", %trace_id);
        self.run_traced(trace_id, query).instrument(span).await
    }

    async fn run_traced(&self, trace_id: Uuid, query: &str) -> RunOutcome {
        let mut run = Run::new(trace_id, self.observers.clone());
        run.status(format!("Starting research (trace {})...", trace_id));

        // Planning
        let started = run.enter(Stage::Planning, "Planning searches...".to_string());
        let plan = match self.planner.plan(query).await {
            Ok(plan) => plan,
            Err(e) => return run.fail(Stage::Planning, started, e),
        };
        run.exit(Stage::Planning, started, true);

        // Searching
        let started = run.enter(
            Stage::Searching,
            format!("Searches planned, starting {} searches...", plan.len()),
        );
        let summaries = self.coordinator.gather(&plan).await;
        run.exit(Stage::Searching, started, true);

        // Writing; an empty result set still gets a report.
        let writing = if summaries.is_empty() {
            "No search returned usable results, writing report from the query alone...".to_string()
        } else {
            format!(
                "Searches complete ({}/{} succeeded), writing report...",
                summaries.len(),
                plan.len()
            )
        };
        run.outcome.plan = Some(plan);
        let started = run.enter(Stage::Writing, writing);
        let report = match self.writer.write(query, &summaries).await {
            Ok(report) => report,
            Err(e) => {
                run.outcome.summaries = summaries;
                return run.fail(Stage::Writing, started, e);
            }
        };
        run.outcome.summaries = summaries;
        run.exit(Stage::Writing, started, true);

        // Notifying is best effort; a rejection is recorded, not fatal.
        let started = run.enter(
            Stage::Notifying,
            format!("Report written, sending email via {}...", self.notifier.transport_name()),
        );
        let delivery = self.notifier.notify(&report).await;
        run.exit(Stage::Notifying, started, delivery.is_delivered());

        run.outcome.state = PipelineState::Done;
        match &delivery {
            DeliveryResult::Delivered => run.status("Email sent, research complete".to_string()),
            DeliveryResult::Rejected(failure) => run.status(format!(
                "Email not sent ({}), research complete",
                failure
            )),
        }
        run.report(report.markdown_report.clone());

        run.outcome.delivery = Some(delivery);
        run.outcome.report = Some(report);
        run.finish()
    }
}

/// Single-writer state of one in-flight run.
struct Run {
    outcome: RunOutcome,
    observers: Arc<ObserverSet>,
}

impl Run {
    fn new(trace_id: Uuid, observers: Arc<ObserverSet>) -> Self {
        let now = Utc::now();
        Self {
            outcome: RunOutcome {
                trace_id,
                state: PipelineState::Init,
                statuses: StatusLog::default(),
                plan: None,
                summaries: Vec::new(),
                report: None,
                delivery: None,
                started_at: now,
                finished_at: now,
            },
            observers,
        }
    }

    fn status(&mut self, line: String) {
        self.observers.on_event(&PipelineEvent::Status(line.clone()));
        self.outcome.statuses.push(line);
    }

    /// Append the finished report as the terminal status entry.
    fn report(&mut self, body: String) {
        self.observers.on_event(&PipelineEvent::Report(body.clone()));
        self.outcome.statuses.push(body);
    }

    fn enter(&mut self, stage: Stage, line: String) -> Instant {
        self.outcome.state = stage.into();
        self.observers.on_event(&PipelineEvent::StageEntered(stage));
        self.status(line);
        Instant::now()
    }

    fn exit(&self, stage: Stage, started: Instant, succeeded: bool) {
        self.observers.on_event(&PipelineEvent::StageExited {
            stage,
            elapsed: started.elapsed(),
            succeeded,
        });
    }

    fn fail(mut self, stage: Stage, started: Instant, error: AppError) -> RunOutcome {
        tracing::error!(%stage, "Research failed: {}", error);
        if let Some(raw) = error.raw_payload() {
            tracing::debug!(%stage, raw, "Unparseable generation output");
        }
        self.exit(stage, started, false);
        self.outcome.state = PipelineState::Failed(stage);
        self.status(format!("Research failed during {}: {}", stage, error));
        self.finish()
    }

    fn finish(mut self) -> RunOutcome {
        self.outcome.finished_at = Utc::now();
        self.outcome
    }
}

/// Assembles a [`ResearchManager`] from one generation backend plus optional collaborators.
pub struct ResearchManagerBuilder {
    llm: Arc<dyn LLMClient>,
    settings: ResearchSettings,
    web: Option<Arc<dyn WebSearch>>,
    searcher: Option<Arc<dyn Searcher>>,
    transport: Option<Arc<dyn MailTransport>>,
    compose_email: bool,
    observers: ObserverSet,
}

impl ResearchManagerBuilder {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        let mut observers = ObserverSet::new();
        observers.push(Arc::new(TracingObserver));

        Self {
            llm,
            settings: ResearchSettings::default(),
            web: None,
            searcher: None,
            transport: None,
            compose_email: true,
            observers,
        }
    }

    pub fn settings(mut self, settings: ResearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Ground search summaries in results from `web`.
    pub fn web_search(mut self, web: Arc<dyn WebSearch>) -> Self {
        self.web = Some(web);
        self
    }

    /// Replace the search agent entirely.
    pub fn searcher(mut self, searcher: Arc<dyn Searcher>) -> Self {
        self.searcher = Some(searcher);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Whether the email agent formats the report as HTML before sending.
    pub fn compose_email(mut self, enabled: bool) -> Self {
        self.compose_email = enabled;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> ResearchManager {
        let observers = Arc::new(self.observers);
        let settings = self.settings;

        let searcher = self.searcher.unwrap_or_else(|| {
            let agent = SearchAgent::new(self.llm.clone());
            let agent = match self.web {
                Some(web) => agent.with_web_search(web, settings.results_per_search),
                None => agent,
            };
            Arc::new(agent)
        });

        let coordinator = ResearchCoordinator::new(searcher)
            .with_task_timeout(settings.search_timeout)
            .with_observer(observers.clone());

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(DisabledTransport));
        let mut notifier = Notifier::new(transport);
        if self.compose_email {
            notifier = notifier.with_composer(EmailAgent::new(self.llm.clone()));
        }

        ResearchManager {
            planner: PlannerAgent::new(self.llm.clone(), settings.max_searches),
            coordinator,
            writer: WriterAgent::new(self.llm),
            notifier,
            observers,
        }
    }
}
