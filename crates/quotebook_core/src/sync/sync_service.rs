//! Sync cycle orchestration.
//!
//! # Responsibility
//! - Merge the remote set into the local quote book (remote wins).
//! - Optionally publish the merged set back to the remote.
//! - Repeat cycles on a fixed interval for watch mode.
//!
//! # Invariants
//! - Fetch failures never modify the local set.
//! - The merged set is persisted before it is published.

use super::remote::{QuoteRemote, RemoteError};
use crate::reconcile::{reconcile_with_report, CollectingNotifier, ConflictNotifier};
use crate::repo::kv_store::KeyValueStore;
use crate::service::quote_service::{QuoteService, QuoteServiceError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::thread;
use std::time::{Duration, Instant};

pub type SyncResult<T> = Result<T, SyncError>;

/// Sync cycle failure, tagged with the stage that failed.
#[derive(Debug)]
pub enum SyncError {
    Load(QuoteServiceError),
    Fetch(RemoteError),
    Persist(QuoteServiceError),
    Publish(RemoteError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "loading local quotes failed: {err}"),
            Self::Fetch(err) => write!(f, "fetching remote quotes failed: {err}"),
            Self::Persist(err) => write!(f, "saving merged quotes failed: {err}"),
            Self::Publish(err) => write!(f, "publishing merged quotes failed: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(err) | Self::Publish(err) => Some(err),
            Self::Load(err) | Self::Persist(err) => Some(err),
        }
    }
}

impl SyncError {
    fn stage(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Fetch(_) => "fetch",
            Self::Persist(_) => "persist",
            Self::Publish(_) => "publish",
        }
    }
}

/// Counts describing one completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub local_count: usize,
    pub remote_count: usize,
    pub merged_count: usize,
    pub overwritten: usize,
    pub appended: usize,
    pub published: bool,
}

impl SyncReport {
    /// User-facing summary line.
    pub fn message(&self) -> String {
        let mut message = format!(
            "Synced {} remote quote(s): {} added, {} updated; {} quote(s) stored.",
            self.remote_count, self.appended, self.overwritten, self.merged_count
        );
        if self.published {
            message.push_str(" Published merged set.");
        }
        message
    }
}

/// Totals for a run of periodic cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodicSyncSummary {
    pub cycles: u32,
    pub failures: u32,
}

/// Sync options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// POST the merged set back to the remote after persisting it.
    pub publish: bool,
}

/// Runs sync cycles against one remote.
pub struct SyncService<R: QuoteRemote> {
    remote: R,
    options: SyncOptions,
}

impl<R: QuoteRemote> SyncService<R> {
    pub fn new(remote: R, options: SyncOptions) -> Self {
        Self { remote, options }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Runs one fetch → reconcile → persist → publish cycle.
    pub fn run_cycle<L, S, N>(
        &self,
        quotes: &mut QuoteService<L, S>,
        notifier: &mut N,
    ) -> SyncResult<SyncReport>
    where
        L: KeyValueStore,
        S: KeyValueStore,
        N: ConflictNotifier + ?Sized,
    {
        let started_at = Instant::now();
        info!("event=sync_cycle module=sync status=start");

        let result = self.run_cycle_inner(quotes, notifier);
        match &result {
            Ok(report) => info!(
                "event=sync_cycle module=sync status=ok duration_ms={} remote_count={} overwritten={} appended={} merged_count={} published={}",
                started_at.elapsed().as_millis(),
                report.remote_count,
                report.overwritten,
                report.appended,
                report.merged_count,
                report.published
            ),
            Err(err) => error!(
                "event=sync_cycle module=sync status=error duration_ms={} stage={} error={}",
                started_at.elapsed().as_millis(),
                err.stage(),
                err
            ),
        }
        result
    }

    /// Runs cycles back to back, sleeping `interval` between them.
    ///
    /// Stops after `max_cycles` when given (`Some(0)` runs nothing),
    /// otherwise runs until the process exits. A failed cycle is counted and reported to `on_cycle`; the next
    /// one still runs.
    pub fn run_periodic<L, S, N, F>(
        &self,
        quotes: &mut QuoteService<L, S>,
        notifier: &mut N,
        interval: Duration,
        max_cycles: Option<u32>,
        mut on_cycle: F,
    ) -> PeriodicSyncSummary
    where
        L: KeyValueStore,
        S: KeyValueStore,
        N: ConflictNotifier + ?Sized,
        F: FnMut(u32, &SyncResult<SyncReport>),
    {
        let mut summary = PeriodicSyncSummary::default();
        let limit_reached =
            |summary: &PeriodicSyncSummary| max_cycles.is_some_and(|max| summary.cycles >= max);
        if limit_reached(&summary) {
            return summary;
        }
        loop {
            summary.cycles += 1;
            let result = self.run_cycle(quotes, notifier);
            if let Err(err) = &result {
                summary.failures += 1;
                warn!(
                    "event=sync_periodic module=sync status=error cycle={} error={}",
                    summary.cycles, err
                );
            }
            on_cycle(summary.cycles, &result);

            if limit_reached(&summary) {
                break;
            }
            thread::sleep(interval);
        }
        summary
    }

    fn run_cycle_inner<L, S, N>(
        &self,
        quotes: &mut QuoteService<L, S>,
        notifier: &mut N,
    ) -> SyncResult<SyncReport>
    where
        L: KeyValueStore,
        S: KeyValueStore,
        N: ConflictNotifier + ?Sized,
    {
        quotes.reload().map_err(SyncError::Load)?;
        let remote = self.remote.fetch_quotes().map_err(SyncError::Fetch)?;
        let local_count = quotes.len();

        // Conflicts are only announced once the merged set is stored.
        let mut pending = CollectingNotifier::new();
        let merged = reconcile_with_report(quotes.quotes(), &remote, &mut pending);
        quotes
            .replace_all(merged.quotes)
            .map_err(SyncError::Persist)?;
        for message in &pending.messages {
            notifier.notify(message);
        }

        if self.options.publish {
            self.remote
                .publish_quotes(quotes.quotes())
                .map_err(SyncError::Publish)?;
        }

        Ok(SyncReport {
            local_count,
            remote_count: remote.len(),
            merged_count: quotes.len(),
            overwritten: merged.overwritten,
            appended: merged.appended,
            published: self.options.publish,
        })
    }
}
