use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

mod aggregate;
mod tips;

pub use aggregate::{aggregate_records, day_key};
pub use tips::generate_tips;

/// One billable model invocation extracted from a session log line.
/// Immutable once created; timestamps are RFC3339 UTC with millisecond
/// precision, normalized at extraction time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageRecord {
    pub timestamp: String,
    pub provider: String,
    pub model: String,
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub total_tokens: u64,
    pub cost: f64,
    pub cost_input: f64,
    pub cost_output: f64,
}

/// Bytes fully consumed per session file, keyed by file name. Offsets only
/// grow; a file whose current size is at or below its offset has no new data.
pub type ScanState = BTreeMap<String, u64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageSummary {
    pub total_cost: f64,
    pub total_tokens: u64,
    pub total_calls: u64,
    pub today_cost: f64,
    pub week_cost: f64,
    pub month_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyUsage {
    pub date: String,
    pub cost: f64,
    pub tokens: u64,
    pub calls: u64,
    pub input: u64,
    pub output: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelUsage {
    pub model: String,
    pub provider: String,
    /// `provider/model`, the identity used by pricing lookups.
    pub key: String,
    pub cost: f64,
    pub tokens: u64,
    pub calls: u64,
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderUsage {
    pub provider: String,
    pub cost: f64,
    pub tokens: u64,
    pub calls: u64,
}

/// Multi-axis summary recomputed in full from the accumulated record set on
/// every refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageAggregate {
    pub summary: UsageSummary,
    pub daily: Vec<DailyUsage>,
    pub models: Vec<ModelUsage>,
    pub providers: Vec<ProviderUsage>,
}

/// Per-token-class unit prices for one `provider/model` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelPrice {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_write: f64,
}

pub type PricingTable = BTreeMap<String, ModelPrice>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Info,
    Success,
    Warning,
    Danger,
}

/// Heuristic cost observation derived from the current aggregate; regenerated
/// from scratch each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: TipKind,
}

/// Outcome of the external quota command. `available` with `report` for the
/// structured tier, `available` with `raw` for the plain-text tier, and
/// `error` when both tiers failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaReport {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The served snapshot: everything the dashboard needs for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageReport {
    pub summary: UsageSummary,
    pub daily: Vec<DailyUsage>,
    pub models: Vec<ModelUsage>,
    pub providers: Vec<ProviderUsage>,
    pub pricing: PricingTable,
    pub tips: Vec<Tip>,
    pub quotas: Option<QuotaReport>,
    pub updated_at: String,
}

/// The durable unit persisted as one JSON document: scan offsets, the full
/// accumulated record set, and the last committed report. Every field
/// defaults so a partial or empty document loads as an empty snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub file_offsets: ScanState,
    pub records: Vec<UsageRecord>,
    pub report: Option<UsageReport>,
}
