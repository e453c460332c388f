use std::io;
use std::path::Path;

use monitor_core::{ModelPrice, PricingTable};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::services::SharedConfig;

/// Reads the per-model unit prices out of the OpenClaw configuration file.
/// The table is rebuilt on every refresh so edits to the config show up on
/// the next cycle without a restart.
#[derive(Clone)]
pub struct PricingService {
    config: SharedConfig,
}

impl PricingService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// A missing config file is the common case on a fresh install and loads
    /// as an empty table; anything else unreadable is worth a warning.
    pub fn load(&self) -> PricingTable {
        let path = ingest::pricing_config_path(&self.config.openclaw_home);
        match load_pricing_table(&path) {
            Ok(table) => table,
            Err(crate::AppError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                PricingTable::new()
            }
            Err(err) => {
                warn!("failed to load pricing config: {}", err);
                PricingTable::new()
            }
        }
    }
}

fn load_pricing_table(path: &Path) -> Result<PricingTable> {
    let contents = std::fs::read_to_string(path)?;
    let config: Value = serde_json::from_str(&contents)?;
    Ok(pricing_from_config(&config))
}

/// Walks `models.providers.<name>.models[]` and keys each entry as
/// `provider/id`. Entries without an id are skipped; missing cost components
/// price at zero.
fn pricing_from_config(config: &Value) -> PricingTable {
    let mut table = PricingTable::new();
    let Some(providers) = config
        .pointer("/models/providers")
        .and_then(Value::as_object)
    else {
        return table;
    };
    for (provider, entry) in providers {
        let Some(models) = entry.get("models").and_then(Value::as_array) else {
            continue;
        };
        for model in models {
            let Some(id) = model.get("id").and_then(Value::as_str) else {
                continue;
            };
            let cost = model.get("cost");
            table.insert(
                format!("{}/{}", provider, id),
                ModelPrice {
                    input: cost_component(cost, "input"),
                    output: cost_component(cost, "output"),
                    cache_read: cost_component(cost, "cacheRead"),
                    cache_write: cost_component(cost, "cacheWrite"),
                },
            );
        }
    }
    table
}

fn cost_component(cost: Option<&Value>, key: &str) -> f64 {
    cost.and_then(|value| value.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}
