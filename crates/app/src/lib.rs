pub mod app;
pub mod error;
pub mod services;
pub mod snapshot;
pub mod startup;

pub use app::{AppConfig, AppState};
pub use error::{AppError, Result};
pub use services::{
    AppServices, CollectOutcome, CollectSummary, CollectorService, PricingService, QuotaService,
};
pub use snapshot::SnapshotCell;
pub use startup::{AppPaths, ensure_app_data_dir};
