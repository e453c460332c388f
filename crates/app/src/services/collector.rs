use std::sync::{Arc, Mutex, TryLockError};

use chrono::{Local, SecondsFormat, Utc};
use ingest::scan_sessions;
use monitor_core::{CacheSnapshot, UsageReport, aggregate_records, generate_tips};
use monitor_store::CacheStore;
use tracing::{debug, info, warn};

use crate::services::{PricingService, QuotaService, SharedConfig};
use crate::snapshot::SnapshotCell;

/// One committed refresh, for logs and the `--once` summary line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectSummary {
    pub total_calls: u64,
    pub total_cost: f64,
    pub records_extracted: usize,
    pub files_scanned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollectOutcome {
    Completed(CollectSummary),
    /// Another cycle held the guard; this tick was dropped, not queued.
    Skipped,
}

struct CollectorInner {
    config: SharedConfig,
    pricing: PricingService,
    quotas: QuotaService,
    snapshot: SnapshotCell,
    store: CacheStore,
    /// Durable state carried between cycles. Doubles as the single-flight
    /// guard: `collect` takes it with `try_lock` and skips when contended.
    state: Mutex<CacheSnapshot>,
}

/// Runs the refresh cycle: scan the session logs from the recorded offsets,
/// rebuild the aggregate, regenerate tips, fetch quotas, persist the cache
/// document, and swap the new report into the snapshot cell.
#[derive(Clone)]
pub struct CollectorService {
    inner: Arc<CollectorInner>,
}

impl CollectorService {
    pub(super) fn new(
        config: SharedConfig,
        pricing: PricingService,
        quotas: QuotaService,
        snapshot: SnapshotCell,
    ) -> Self {
        let store = CacheStore::new(config.cache_path.clone());
        Self {
            inner: Arc::new(CollectorInner {
                config,
                pricing,
                quotas,
                snapshot,
                store,
                state: Mutex::new(CacheSnapshot::default()),
            }),
        }
    }

    /// Loads the persisted cache into the cycle state and, when a report was
    /// committed before, into the snapshot cell. Called once at startup; an
    /// unreadable cache degrades to the empty snapshot with a warning.
    pub fn prime(&self) {
        let loaded = match self.inner.store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                info!("no cached snapshot; starting empty");
                return;
            }
            Err(err) => {
                warn!("failed to load cached snapshot: {}; starting empty", err);
                return;
            }
        };
        if let Some(report) = &loaded.report {
            self.inner.snapshot.replace(report.clone());
        }
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        *state = loaded;
    }

    pub fn collect(&self) -> CollectOutcome {
        let mut state = match self.inner.state.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(err)) => err.into_inner(),
            Err(TryLockError::WouldBlock) => {
                debug!("refresh already in progress; skipping this tick");
                return CollectOutcome::Skipped;
            }
        };

        let prior = std::mem::take(&mut *state);
        let sessions = self.inner.config.sessions_dir();
        let outcome = scan_sessions(&sessions, prior.file_offsets, prior.records);
        for issue in &outcome.stats.issues {
            warn!(file = %issue.file, "session file not fully read: {}", issue.message);
        }

        let aggregate = aggregate_records(&outcome.records, Local::now());
        let pricing = self.inner.pricing.load();
        let tips = generate_tips(&aggregate, &pricing);
        let quotas = self.inner.quotas.fetch();

        let report = UsageReport {
            summary: aggregate.summary,
            daily: aggregate.daily,
            models: aggregate.models,
            providers: aggregate.providers,
            pricing,
            tips,
            quotas: Some(quotas),
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let summary = CollectSummary {
            total_calls: report.summary.total_calls,
            total_cost: report.summary.total_cost,
            records_extracted: outcome.stats.records_extracted,
            files_scanned: outcome.stats.files_scanned,
        };

        let snapshot = CacheSnapshot {
            file_offsets: outcome.offsets,
            records: outcome.records,
            report: Some(report.clone()),
        };
        // A failed write costs durability only; the in-memory state keeps the
        // current offsets and the next cycle retries the save.
        if let Err(err) = self.inner.store.save(&snapshot) {
            warn!("failed to persist cache snapshot: {}", err);
        }
        *state = snapshot;
        self.inner.snapshot.replace(report);

        info!(
            calls = summary.total_calls,
            cost = summary.total_cost,
            new_records = summary.records_extracted,
            "refresh committed"
        );
        CollectOutcome::Completed(summary)
    }
}
