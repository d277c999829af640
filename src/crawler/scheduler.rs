//! Periodic crawl scheduler
//!
//! Runs walk-then-reconcile cycles forever, sleeping for the configured
//! interval between the end of one cycle and the start of the next. A cycle
//! that fails is logged and the next one runs on schedule. Each cycle leaves
//! one row in the run ledger.
//!
//! The scheduler stops when its shutdown channel flips to `true`. A walk in
//! flight is abandoned; a reconcile in flight always finishes first.

use crate::catalog::{CatalogService, ReconcileReport};
use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Transport;
use crate::crawler::walker::{CrawlWalker, StopReason};
use crate::storage::{RunStatus, RunTotals, SqliteStorage, Storage, StorageResult};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Summary of one crawl cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Ledger row for this cycle
    pub run_id: i64,
    pub status: RunStatus,
    pub pages_fetched: usize,
    pub records_extracted: usize,
    /// Listing blocks the extractor dropped
    pub skipped: usize,
    /// `None` when the walk was interrupted
    pub stop: Option<StopReason>,
    /// `None` when the walk was interrupted or reconciliation failed
    pub reconcile: Option<ReconcileReport>,
}

/// Drives crawl cycles on a fixed interval
pub struct Scheduler<T, S = SqliteStorage> {
    walker: CrawlWalker<T>,
    catalog: CatalogService<S>,
    start_url: String,
    interval: Duration,
    config_hash: String,
}

/// Control handle for a spawned scheduler
///
/// Dropping the handle detaches the task; it keeps crawling until the
/// runtime shuts down. Use [`SchedulerHandle::stop`] to end it.
#[must_use = "dropping the handle leaves the scheduler running with no way to stop it"]
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signals shutdown and waits for the scheduler task to exit
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Scheduler task ended abnormally: {}", e);
        }
    }
}

/// Resolves once shutdown is requested
///
/// Only an explicit `true` counts; if the sender is gone this never resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

impl<T, S> Scheduler<T, S>
where
    T: Transport,
    S: Storage + Send,
{
    pub fn new(
        walker: CrawlWalker<T>,
        catalog: CatalogService<S>,
        start_url: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            walker,
            catalog,
            start_url: start_url.into(),
            interval,
            config_hash: String::new(),
        }
    }

    /// Creates a scheduler using the start URL and interval from the config
    pub fn from_config(
        walker: CrawlWalker<T>,
        catalog: CatalogService<S>,
        config: &CrawlerConfig,
    ) -> Self {
        Self::new(
            walker,
            catalog,
            config.start_url.clone(),
            Duration::from_secs(config.interval_secs),
        )
    }

    /// Hash of the configuration, recorded on every ledger row
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    pub fn catalog(&self) -> &CatalogService<S> {
        &self.catalog
    }

    /// Runs a single walk-then-reconcile cycle to completion
    pub async fn run_cycle(&self) -> crate::Result<CycleReport> {
        let (_, mut shutdown) = watch::channel(false);
        self.cycle(&mut shutdown).await
    }

    async fn cycle(&self, shutdown: &mut watch::Receiver<bool>) -> crate::Result<CycleReport> {
        let run_id = self
            .catalog
            .storage()
            .with(|s| s.create_run(&self.config_hash))?;
        tracing::info!("Starting crawl cycle (run {}) at {}", run_id, self.start_url);

        let outcome = tokio::select! {
            outcome = self.walker.walk(&self.start_url) => outcome,
            _ = shutdown_requested(shutdown) => {
                tracing::info!("Crawl cycle {} interrupted by shutdown", run_id);
                self.finish_run(run_id, RunStatus::Interrupted, &RunTotals::default())?;
                return Ok(CycleReport {
                    run_id,
                    status: RunStatus::Interrupted,
                    pages_fetched: 0,
                    records_extracted: 0,
                    skipped: 0,
                    stop: None,
                    reconcile: None,
                });
            }
        };

        let mut totals = RunTotals {
            pages_fetched: outcome.pages_fetched as u64,
            records_extracted: outcome.records.len() as u64,
            stop_reason: Some(outcome.stop.as_str().to_string()),
            ..RunTotals::default()
        };

        let (status, reconcile) = match self.catalog.sync(&outcome.records) {
            Ok(report) => {
                totals.inserted = report.inserted as u64;
                totals.updated = report.updated as u64;
                totals.unchanged = report.unchanged as u64;
                (RunStatus::Completed, Some(report))
            }
            Err(e) => {
                tracing::error!("Reconcile failed for run {}: {}", run_id, e);
                totals.stop_reason = Some("reconcile-failed".to_string());
                (RunStatus::Failed, None)
            }
        };

        self.finish_run(run_id, status, &totals)?;

        tracing::info!(
            "Crawl cycle {} finished: {} pages, {} records, {} inserted, {} updated ({})",
            run_id,
            totals.pages_fetched,
            totals.records_extracted,
            totals.inserted,
            totals.updated,
            outcome.stop.as_str()
        );

        Ok(CycleReport {
            run_id,
            status,
            pages_fetched: outcome.pages_fetched,
            records_extracted: outcome.records.len(),
            skipped: outcome.skipped,
            stop: Some(outcome.stop),
            reconcile,
        })
    }

    fn finish_run(&self, run_id: i64, status: RunStatus, totals: &RunTotals) -> StorageResult<()> {
        self.catalog
            .storage()
            .with(|s| s.finish_run(run_id, status, totals))
    }

    /// Runs cycles until `shutdown` becomes `true`
    pub async fn run_until_shutdown(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Scheduler started: every {:?} from {}",
            self.interval,
            self.start_url
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.cycle(&mut shutdown).await {
                Ok(report) if report.status == RunStatus::Interrupted => break,
                Ok(_) => {}
                Err(e) => tracing::error!("Crawl cycle failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }
        }

        tracing::info!("Scheduler stopped");
    }

    /// Moves the scheduler onto its own task
    pub fn spawn(self) -> SchedulerHandle
    where
        T: 'static,
        S: 'static,
    {
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(async move { self.run_until_shutdown(receiver).await });
        SchedulerHandle { shutdown, task }
    }
}
