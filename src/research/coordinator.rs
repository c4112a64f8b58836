use crate::agents::Searcher;
use crate::research::observer::{PipelineEvent, PipelineObserver, TracingObserver};
use crate::types::{SearchFailure, SearchOutcome, SearchPlan};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Runs every task of a plan concurrently and keeps the summaries that succeed.
pub struct ResearchCoordinator {
    searcher: Arc<dyn Searcher>,
    task_timeout: Option<Duration>,
    observer: Arc<dyn PipelineObserver>,
}

impl ResearchCoordinator {
    pub fn new(searcher: Arc<dyn Searcher>) -> Self {
        Self {
            searcher,
            task_timeout: None,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Bound each task individually; a task that overruns counts as failed.
    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Execute all searches in `plan` at once.
    ///
    /// Summaries are returned in the order their tasks finish, which is not
    /// the plan order. Failed tasks are left out, so a plan where every
    /// search fails yields an empty list. Returns only once every task has
    /// finished.
    pub async fn gather(&self, plan: &SearchPlan) -> Vec<String> {
        tracing::info!("Searching... ({} tasks)", plan.len());
        let mut set = JoinSet::new();

        for (index, task) in plan.iter().cloned().enumerate() {
            let searcher = Arc::clone(&self.searcher);
            let timeout = self.task_timeout;

            set.spawn(async move {
                let search = AssertUnwindSafe(async {
                    match timeout {
                        Some(limit) => tokio::time::timeout(limit, searcher.search(&task))
                            .await
                            .unwrap_or(SearchOutcome::Failed(SearchFailure::TimedOut(limit))),
                        None => searcher.search(&task).await,
                    }
                })
                .catch_unwind();

                let outcome = search.await.unwrap_or_else(|panic| {
                    SearchOutcome::Failed(SearchFailure::Aborted(panic_message(panic.as_ref())))
                });
                (index, task, outcome)
            });
        }

        let mut results = Vec::with_capacity(plan.len());
        while let Some(joined) = set.join_next().await {
            let (index, task, outcome) = match joined {
                Ok(slot) => slot,
                Err(e) => {
                    tracing::warn!("Search task did not complete: {}", e);
                    continue;
                }
            };

            let (succeeded, detail) = match &outcome {
                SearchOutcome::Summary(_) => (true, None),
                SearchOutcome::Failed(failure) => (false, Some(failure.to_string())),
            };
            self.observer.on_event(&PipelineEvent::TaskCompleted {
                index,
                term: task.term,
                succeeded,
                detail,
            });

            if let Some(summary) = outcome.into_summary() {
                results.push(summary);
            }
        }

        tracing::info!(
            "Finished searching: {}/{} searches succeeded",
            results.len(),
            plan.len()
        );
        results
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "search task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::observer::ChannelObserver;
    use crate::types::SearchTask;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Each term encodes its behaviour: `ok:<ms>`, `fail:<ms>`, `hang`, `panic`.
    struct Scripted {
        finished: AtomicUsize,
    }

    impl Scripted {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                finished: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Searcher for Scripted {
        async fn search(&self, task: &SearchTask) -> SearchOutcome {
            let (kind, delay) = task.term.split_once(':').unwrap_or((task.term.as_str(), "0"));
            match kind {
                "hang" => std::future::pending::<()>().await,
                "panic" => panic!("boom"),
                _ => {}
            }
            tokio::time::sleep(Duration::from_millis(delay.parse().unwrap_or(0))).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            match kind {
                "ok" => SearchOutcome::Summary(format!("summary of {}", task.term)),
                _ => SearchOutcome::Failed(SearchFailure::Generation("scripted".into())),
            }
        }
    }

    fn plan(terms: &[&str]) -> SearchPlan {
        SearchPlan::new(terms.iter().map(|t| SearchTask::new(*t, "")).collect())
    }

    #[tokio::test]
    async fn test_gather_keeps_only_successes() {
        let searcher = Scripted::new();
        let coordinator = ResearchCoordinator::new(searcher.clone());

        let results = coordinator
            .gather(&plan(&["ok:5", "fail:1", "ok:1", "fail:3", "ok:2"]))
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(searcher.finished.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_gather_collects_in_completion_order() {
        let coordinator = ResearchCoordinator::new(Scripted::new());

        let results = coordinator.gather(&plan(&["ok:120", "ok:10", "ok:60"])).await;

        assert_eq!(
            results,
            vec!["summary of ok:10", "summary of ok:60", "summary of ok:120"]
        );
    }

    #[tokio::test]
    async fn test_gather_all_failed_is_empty() {
        let coordinator = ResearchCoordinator::new(Scripted::new());
        let results = coordinator.gather(&plan(&["fail:1", "fail:2"])).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_gather_empty_plan() {
        let coordinator = ResearchCoordinator::new(Scripted::new());
        assert!(coordinator.gather(&SearchPlan::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_drops_hung_task() {
        let (observer, mut rx) = ChannelObserver::new();
        let coordinator = ResearchCoordinator::new(Scripted::new())
            .with_task_timeout(Some(Duration::from_millis(50)))
            .with_observer(Arc::new(observer));

        let results = coordinator.gather(&plan(&["hang", "ok:1"])).await;
        assert_eq!(results, vec!["summary of ok:1"]);

        let mut timed_out = false;
        while let Ok(event) = rx.try_recv() {
            if let PipelineEvent::TaskCompleted {
                index: 0,
                succeeded: false,
                detail: Some(detail),
                ..
            } = event
            {
                timed_out = detail.contains("timed out");
            }
        }
        assert!(timed_out);
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let (observer, mut rx) = ChannelObserver::new();
        let coordinator =
            ResearchCoordinator::new(Scripted::new()).with_observer(Arc::new(observer));

        let results = coordinator.gather(&plan(&["panic", "ok:1"])).await;
        assert_eq!(results.len(), 1);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| matches!(
            e,
            PipelineEvent::TaskCompleted { index: 0, succeeded: false, detail: Some(d), .. }
                if d.contains("boom")
        )));
    }
}
