use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, Local};

use crate::{DailyUsage, ModelUsage, ProviderUsage, UsageAggregate, UsageRecord, UsageSummary};

/// Local-calendar day bucket key for a record timestamp.
pub fn day_key(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        // Records are normalized at extraction; keep totals conserved for
        // anything that still fails to parse.
        Err(_) => timestamp.chars().take(10).collect(),
    }
}

fn week_start_key(now: DateTime<Local>) -> String {
    let days_from_sunday = now.weekday().num_days_from_sunday() as u64;
    let start = now.date_naive() - Days::new(days_from_sunday);
    start.format("%Y-%m-%d").to_string()
}

/// Folds the full record set into per-day, per-model, and per-provider
/// buckets plus rolling totals. Pure and total: `now` is the aggregation
/// wall-clock instant the rolling windows are anchored to, and no record can
/// cause a failure.
pub fn aggregate_records(records: &[UsageRecord], now: DateTime<Local>) -> UsageAggregate {
    let today_key = now.format("%Y-%m-%d").to_string();
    let week_key = week_start_key(now);
    let month_key = now.format("%Y-%m").to_string();

    let mut daily: BTreeMap<String, DailyUsage> = BTreeMap::new();
    let mut models: Vec<ModelUsage> = Vec::new();
    let mut model_index: HashMap<String, usize> = HashMap::new();
    let mut providers: Vec<ProviderUsage> = Vec::new();
    let mut provider_index: HashMap<String, usize> = HashMap::new();
    let mut summary = UsageSummary::default();

    for record in records {
        let day = day_key(&record.timestamp);

        let bucket = daily.entry(day.clone()).or_insert_with(|| DailyUsage {
            date: day.clone(),
            ..Default::default()
        });
        bucket.cost += record.cost;
        bucket.tokens += record.total_tokens;
        bucket.calls += 1;
        bucket.input += record.input;
        bucket.output += record.output;

        let key = format!("{}/{}", record.provider, record.model);
        let index = *model_index.entry(key.clone()).or_insert_with(|| {
            models.push(ModelUsage {
                model: record.model.clone(),
                provider: record.provider.clone(),
                key,
                ..Default::default()
            });
            models.len() - 1
        });
        let model = &mut models[index];
        model.cost += record.cost;
        model.tokens += record.total_tokens;
        model.calls += 1;
        model.input += record.input;
        model.output += record.output;
        model.cache_read += record.cache_read;

        let index = *provider_index
            .entry(record.provider.clone())
            .or_insert_with(|| {
                providers.push(ProviderUsage {
                    provider: record.provider.clone(),
                    ..Default::default()
                });
                providers.len() - 1
            });
        let provider = &mut providers[index];
        provider.cost += record.cost;
        provider.tokens += record.total_tokens;
        provider.calls += 1;

        summary.total_cost += record.cost;
        summary.total_tokens += record.total_tokens;
        summary.total_calls += 1;
        if day == today_key {
            summary.today_cost += record.cost;
        }
        if day.as_str() >= week_key.as_str() {
            summary.week_cost += record.cost;
        }
        if day.starts_with(&month_key) {
            summary.month_cost += record.cost;
        }
    }

    // Stable sorts: exact cost ties keep first-encountered order.
    models.sort_by(|a, b| b.cost.total_cmp(&a.cost));
    providers.sort_by(|a, b| b.cost.total_cmp(&a.cost));

    UsageAggregate {
        summary,
        daily: daily.into_values().collect(),
        models,
        providers,
    }
}
