use std::path::PathBuf;

use crate::services::{AppServices, CollectOutcome};
use crate::snapshot::SnapshotCell;

/// Paths and commands needed to run the monitor.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openclaw_home: PathBuf,
    pub cache_path: PathBuf,
    /// Program invoked for provider quota state. Tests substitute a stub.
    pub quota_command: String,
}

impl AppConfig {
    pub fn new(openclaw_home: PathBuf, cache_path: PathBuf) -> Self {
        Self {
            openclaw_home,
            cache_path,
            quota_command: "openclaw".to_string(),
        }
    }

    pub fn sessions_dir(&self) -> PathBuf {
        ingest::sessions_dir(&self.openclaw_home)
    }
}

/// Application state shared by the serving layer and the refresh loop.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
    pub snapshot: SnapshotCell,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let snapshot = SnapshotCell::new();
        let services = AppServices::new(&config, snapshot.clone());
        Self {
            config,
            services,
            snapshot,
        }
    }

    /// Loads the persisted cache so restarts serve the last committed report
    /// before the first refresh finishes.
    pub fn prime(&self) {
        self.services.collector.prime();
    }

    pub fn collect(&self) -> CollectOutcome {
        self.services.collector.collect()
    }
}
