use std::sync::{Arc, RwLock};

use monitor_core::UsageReport;

/// Swap-on-commit handle for the latest committed report. Readers clone the
/// inner `Arc` and never block on a refresh in progress; writers replace the
/// pointer wholesale so a reader observes either the old report or the new
/// one, never a mix.
#[derive(Clone, Default)]
pub struct SnapshotCell {
    inner: Arc<RwLock<Arc<UsageReport>>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Arc<UsageReport> {
        self.inner
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn replace(&self, report: UsageReport) {
        *self.inner.write().unwrap_or_else(|err| err.into_inner()) = Arc::new(report);
    }
}
