use axum::Json;
use axum::extract::{Query, State};
use chrono::{Duration, Local};
use monitor_core::{DailyUsage, UsageReport};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::HttpState;

const DEFAULT_DAYS: i64 = 30;
// Upper bound keeps the cutoff arithmetic in range for any query value.
const MAX_DAYS: i64 = 36_500;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn summary(State(state): State<HttpState>) -> Json<Value> {
    let report = state.snapshot.latest();
    Json(json!({ "summary": report.summary, "updatedAt": report.updated_at }))
}

#[derive(Deserialize)]
pub struct DailyQuery {
    days: Option<i64>,
}

pub async fn daily(State(state): State<HttpState>, Query(query): Query<DailyQuery>) -> Json<Value> {
    let report = state.snapshot.latest();
    let days = query.days.unwrap_or(DEFAULT_DAYS).clamp(0, MAX_DAYS);
    let cutoff = (Local::now() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string();
    // Bucket dates and the cutoff share the %Y-%m-%d form, so the lexical
    // comparison is also the chronological one.
    let daily: Vec<&DailyUsage> = report
        .daily
        .iter()
        .filter(|bucket| bucket.date.as_str() >= cutoff.as_str())
        .collect();
    Json(json!({ "daily": daily, "days": days }))
}

pub async fn models(State(state): State<HttpState>) -> Json<Value> {
    let report = state.snapshot.latest();
    Json(json!({ "models": report.models }))
}

pub async fn quotas(State(state): State<HttpState>) -> Json<Value> {
    let report = state.snapshot.latest();
    Json(json!({ "quotas": report.quotas, "providers": report.providers }))
}

pub async fn tips(State(state): State<HttpState>) -> Json<Value> {
    let report = state.snapshot.latest();
    Json(json!({ "tips": report.tips }))
}

pub async fn all(State(state): State<HttpState>) -> Json<UsageReport> {
    Json((*state.snapshot.latest()).clone())
}
