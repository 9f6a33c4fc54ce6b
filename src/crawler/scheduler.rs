//! Bounded-concurrency scheduler for resolution tasks
//!
//! This module handles:
//! - Admitting work items while fewer than `concurrency` tasks are in flight
//! - Isolating per-item failures so one item never aborts the batch
//! - Aggregating completions: result callback, outcome counts, progress/ETA
//!
//! Tasks only resolve; everything shared (progress counters, the result
//! callback's state) is touched solely by the loop that joins them.

use crate::crawler::capability::{ExistenceProbe, Renderer};
use crate::crawler::resolver::Resolver;
use crate::state::{ItemOutcome, ProgressState, ResolvedRecord, WorkItem};
use crate::ResolutionError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};

type TaskOutput = (WorkItem, Result<Option<String>, ResolutionError>);

/// Outcome counts for one scheduler run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub failed: usize,
    pub lost: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    fn record(&mut self, outcome: ItemOutcome) {
        self.attempted += 1;
        match outcome {
            ItemOutcome::Resolved => self.resolved += 1,
            ItemOutcome::Unresolved => self.unresolved += 1,
            ItemOutcome::Failed => self.failed += 1,
            ItemOutcome::Lost => self.lost += 1,
        }
    }
}

/// Runs resolutions with a fixed ceiling on in-flight tasks
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    concurrency: usize,
}

impl Scheduler {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Resolves every item, handing each result to `on_result`
    ///
    /// At most `concurrency` resolutions run at once; when the ceiling is
    /// reached, admission waits for any task to finish. Results arrive in
    /// completion order. A failed resolution is logged and reported with an
    /// empty locator.
    ///
    /// # Errors
    ///
    /// Only an error returned by `on_result` stops the run; in-flight tasks
    /// are then cancelled and their sessions released.
    pub async fn run<R, P, F, E>(
        &self,
        resolver: Arc<Resolver<R, P>>,
        items: Vec<WorkItem>,
        mut on_result: F,
    ) -> Result<RunSummary, E>
    where
        R: Renderer,
        P: ExistenceProbe,
        F: FnMut(ResolvedRecord) -> Result<(), E>,
    {
        let mut progress = ProgressState::new(items.len());
        let mut summary = RunSummary::default();
        let mut in_flight: JoinSet<TaskOutput> = JoinSet::new();

        tracing::info!(
            "Scheduling {} items with concurrency {}",
            items.len(),
            self.concurrency
        );

        for item in items {
            while in_flight.len() >= self.concurrency {
                let Some(joined) = in_flight.join_next().await else {
                    break;
                };
                complete(joined, &mut progress, &mut summary, &mut on_result)?;
            }

            let resolver = Arc::clone(&resolver);
            in_flight.spawn(async move {
                let result = resolver.resolve(&item).await;
                (item, result)
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            complete(joined, &mut progress, &mut summary, &mut on_result)?;
        }

        if !progress.is_complete() {
            tracing::warn!(
                "Scheduler drained at {}/{} items",
                progress.processed(),
                progress.total()
            );
        }

        summary.elapsed = progress.elapsed();
        Ok(summary)
    }
}

/// Handles one finished task: report its record, count it, log progress
fn complete<F, E>(
    joined: Result<TaskOutput, JoinError>,
    progress: &mut ProgressState,
    summary: &mut RunSummary,
    on_result: &mut F,
) -> Result<(), E>
where
    F: FnMut(ResolvedRecord) -> Result<(), E>,
{
    let outcome = match joined {
        Ok((item, result)) => {
            let label = item.to_string();
            let (locator, outcome) = match result {
                Ok(Some(locator)) => (Some(locator), ItemOutcome::Resolved),
                Ok(None) => (None, ItemOutcome::Unresolved),
                Err(e) => {
                    tracing::warn!("{}", e);
                    (None, ItemOutcome::Failed)
                }
            };
            on_result(ResolvedRecord::new(item, locator))?;
            tracing::debug!("{} {}", label, outcome);
            outcome
        }
        Err(e) => {
            tracing::error!("Resolution task ended abnormally: {}", e);
            ItemOutcome::Lost
        }
    };

    summary.record(outcome);
    let snapshot = progress.record_completion();
    tracing::info!("{}", snapshot);
    Ok(())
}
