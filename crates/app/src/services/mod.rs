mod collector;
mod pricing;
mod quotas;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::snapshot::SnapshotCell;

pub use collector::{CollectOutcome, CollectSummary, CollectorService};
pub use pricing::PricingService;
pub use quotas::QuotaService;

pub(crate) type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub collector: CollectorService,
    pub pricing: PricingService,
    pub quotas: QuotaService,
}

impl AppServices {
    pub fn new(config: &AppConfig, snapshot: SnapshotCell) -> Self {
        let shared = Arc::new(config.clone());
        let pricing = PricingService::new(shared.clone());
        let quotas = QuotaService::new(shared.clone());
        let collector =
            CollectorService::new(shared, pricing.clone(), quotas.clone(), snapshot);
        Self {
            collector,
            pricing,
            quotas,
        }
    }
}
