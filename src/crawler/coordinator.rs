//! Run coordinator - main enrichment orchestration logic
//!
//! This module wires one run together:
//! - Loading the source dataset (fatal on failure)
//! - Seeding the record store from previously cleaned output
//! - Computing the completed set and the remaining backlog
//! - Scheduling resolutions and feeding results to the incremental sink
//! - The final flush and run summary

use crate::config::Config;
use crate::crawler::capability::{ExistenceProbe, Renderer};
use crate::crawler::fetcher::{build_http_client, HttpProbe, HttpRenderer};
use crate::crawler::resolver::Resolver;
use crate::crawler::scheduler::{RunSummary, Scheduler};
use crate::dataset::{build_backlog, load_dataset, Backlog};
use crate::storage::{compute_completed, seed_store, CsvFileStore, IncrementalSink};
use crate::{CompletedSet, SweepError};
use std::path::Path;
use std::sync::Arc;

/// What a run would do, computed without touching the store
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Rows read from the source dataset
    pub dataset_rows: usize,

    /// Dataset records that could not be decoded
    pub unreadable_rows: usize,

    /// Item ids already resolved by earlier runs
    pub completed: usize,

    /// Whether the completed set came from the seed file
    pub from_seed: bool,

    pub backlog: Backlog,
}

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub seeded: bool,
    pub completed_before: usize,
    pub summary: RunSummary,
    pub records_written: usize,
    pub flushes: usize,
}

/// Main run coordinator
pub struct Coordinator<R, P> {
    config: Config,
    resolver: Arc<Resolver<R, P>>,
    scheduler: Scheduler,
}

impl Coordinator<HttpRenderer, HttpProbe> {
    /// Creates a coordinator backed by the HTTP renderer and HEAD probe
    pub fn with_http(config: Config) -> Result<Self, SweepError> {
        let client = build_http_client(&config.user_agent)?;
        let renderer = HttpRenderer::new(client.clone());
        let probe = HttpProbe::new(client);
        Self::new(config, renderer, probe)
    }
}

impl<R: Renderer, P: ExistenceProbe> Coordinator<R, P> {
    /// Creates a new coordinator over the given capabilities
    ///
    /// # Errors
    ///
    /// Returns `SweepError::Config` if the page template is invalid.
    pub fn new(config: Config, renderer: R, probe: P) -> Result<Self, SweepError> {
        let resolver = Resolver::from_config(renderer, probe, &config.resolver, &config.crawler)?;
        let scheduler = Scheduler::new(config.crawler.concurrency as usize);

        Ok(Self {
            config,
            resolver: Arc::new(resolver),
            scheduler,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn store_path(&self) -> &Path {
        Path::new(&self.config.output.store_path)
    }

    fn seed_path(&self) -> Option<&Path> {
        self.config.output.seed_path.as_deref().map(Path::new)
    }

    /// Computes the backlog a run would resolve, without writing anything
    ///
    /// When the store does not exist yet, the completed set is read from the
    /// seed file a real run would copy forward.
    pub fn plan(&self) -> Result<RunPlan, SweepError> {
        let dataset = load_dataset(Path::new(&self.config.input.dataset_path))?;

        let (completed, from_seed) = match self.seed_path() {
            Some(seed) if !self.store_path().exists() && seed.is_file() => {
                (compute_completed(seed)?, true)
            }
            _ => (compute_completed(self.store_path())?, false),
        };

        let backlog = build_backlog(&dataset, &completed);
        Ok(RunPlan {
            dataset_rows: dataset.len(),
            unreadable_rows: dataset.unreadable_rows,
            completed: completed.len(),
            from_seed,
            backlog,
        })
    }

    /// Runs the enrichment to completion
    ///
    /// # Errors
    ///
    /// Fails before any work if the dataset cannot be loaded, and mid-run
    /// only if the store cannot be written. Per-item failures never escape;
    /// they are recorded with an empty locator.
    pub async fn run(&self) -> Result<RunReport, SweepError> {
        let dataset_path = Path::new(&self.config.input.dataset_path);
        let dataset = load_dataset(dataset_path).map_err(|e| {
            tracing::error!("Failed to load dataset {}: {}", dataset_path.display(), e);
            e
        })?;
        if dataset.is_empty() {
            tracing::warn!("Dataset {} has no rows", dataset_path.display());
        } else {
            tracing::info!(
                "Loaded {} dataset rows from {}",
                dataset.len(),
                dataset_path.display()
            );
        }

        let store_path = self.store_path();
        let seeded = seed_store(store_path, self.seed_path())?;

        let completed: CompletedSet = compute_completed(store_path)?;
        tracing::info!("{} items already resolved", completed.len());

        let backlog = build_backlog(&dataset, &completed);
        tracing::info!(
            "Remaining items: {} ({} already resolved, {} missing fields)",
            backlog.items.len(),
            backlog.already_completed,
            backlog.missing_fields
        );
        drop(dataset);

        let store = CsvFileStore::open(store_path)?;
        let mut sink = IncrementalSink::new(store, self.config.crawler.flush_threshold as usize);

        let summary = self
            .scheduler
            .run(Arc::clone(&self.resolver), backlog.items, |record| {
                sink.append(record)
            })
            .await?;

        let remainder = sink.flush()?;
        tracing::debug!("Final flush wrote {} records", remainder);

        let report = RunReport {
            seeded,
            completed_before: completed.len(),
            summary,
            records_written: sink.records_written(),
            flushes: sink.flush_count(),
        };
        log_report(&report);

        Ok(report)
    }
}

fn log_report(report: &RunReport) {
    let summary = &report.summary;
    tracing::info!(
        "Run complete: {} attempted, {} resolved, {} unresolved, {} failed in {:.1}s",
        summary.attempted,
        summary.resolved,
        summary.unresolved,
        summary.failed,
        summary.elapsed.as_secs_f64()
    );
    if summary.lost > 0 {
        tracing::warn!("{} resolution tasks ended without a result", summary.lost);
    }
    tracing::info!(
        "Wrote {} records in {} flushes",
        report.records_written,
        report.flushes
    );
}

/// Runs a complete enrichment with the HTTP capabilities
///
/// This is the main entry point for starting a run.
pub async fn run_crawl(config: Config) -> Result<RunReport, SweepError> {
    Coordinator::with_http(config)?.run().await
}
