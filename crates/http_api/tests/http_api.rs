use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Local};
use http_api::{HttpState, router};
use http_body_util::BodyExt;
use monitor_app::SnapshotCell;
use monitor_core::{
    DailyUsage, ModelUsage, ProviderUsage, QuotaReport, Tip, TipKind, UsageReport,
};
use serde_json::Value;
use tower::util::ServiceExt;

fn day_key(days_ago: i64) -> String {
    (Local::now() - Duration::days(days_ago))
        .format("%Y-%m-%d")
        .to_string()
}

fn sample_report() -> UsageReport {
    let mut report = UsageReport::default();
    report.summary.total_cost = 0.45;
    report.summary.total_tokens = 1200;
    report.summary.total_calls = 6;
    report.daily = vec![
        DailyUsage {
            date: day_key(40),
            cost: 0.10,
            tokens: 200,
            calls: 1,
            input: 150,
            output: 50,
        },
        DailyUsage {
            date: day_key(5),
            cost: 0.15,
            tokens: 400,
            calls: 2,
            input: 300,
            output: 100,
        },
        DailyUsage {
            date: day_key(0),
            cost: 0.20,
            tokens: 600,
            calls: 3,
            input: 450,
            output: 150,
        },
    ];
    report.models = vec![ModelUsage {
        model: "gpt".to_string(),
        provider: "openai".to_string(),
        key: "openai/gpt".to_string(),
        cost: 0.45,
        tokens: 1200,
        calls: 6,
        input: 900,
        output: 300,
        cache_read: 0,
    }];
    report.providers = vec![ProviderUsage {
        provider: "openai".to_string(),
        cost: 0.45,
        tokens: 1200,
        calls: 6,
    }];
    report.tips = vec![Tip {
        text: "openai/gpt accounts for 100.0% of total spend ($0.4500)".to_string(),
        kind: TipKind::Info,
    }];
    report.quotas = Some(QuotaReport {
        available: true,
        report: None,
        raw: Some("quota: 42% used".to_string()),
        error: None,
    });
    report.updated_at = "2025-06-16T10:00:00.000Z".to_string();
    report
}

fn app_with(report: Option<UsageReport>) -> Router {
    let snapshot = SnapshotCell::new();
    if let Some(report) = report {
        snapshot.replace(report);
    }
    router(HttpState::new(snapshot))
}

async fn get_json(app: Router, uri: &str) -> Value {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&body).expect("parse body")
}

#[tokio::test]
async fn health_reports_ok() {
    let payload = get_json(app_with(None), "/api/health").await;
    assert_eq!(payload["status"], "ok");
}

#[tokio::test]
async fn summary_returns_totals_and_timestamp() {
    let payload = get_json(app_with(Some(sample_report())), "/api/summary").await;
    assert_eq!(payload["summary"]["totalCalls"], 6);
    assert!((payload["summary"]["totalCost"].as_f64().expect("cost") - 0.45).abs() < 1e-9);
    assert_eq!(payload["updatedAt"], "2025-06-16T10:00:00.000Z");
}

#[tokio::test]
async fn daily_defaults_to_thirty_days() {
    let payload = get_json(app_with(Some(sample_report())), "/api/daily").await;
    assert_eq!(payload["days"], 30);
    let daily = payload["daily"].as_array().expect("daily");
    // The 40-day-old bucket falls outside the default window.
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0]["date"], day_key(5));
}

#[tokio::test]
async fn daily_respects_the_days_cutoff() {
    let app = app_with(Some(sample_report()));
    let payload = get_json(app.clone(), "/api/daily?days=3").await;
    assert_eq!(payload["days"], 3);
    assert_eq!(payload["daily"].as_array().expect("daily").len(), 1);

    let payload = get_json(app, "/api/daily?days=90").await;
    assert_eq!(payload["daily"].as_array().expect("daily").len(), 3);
}

#[tokio::test]
async fn daily_clamps_out_of_range_days_values() {
    let app = app_with(Some(sample_report()));
    // i64::MAX must not take down the request; the window is clamped and the
    // full history answered.
    let payload = get_json(app.clone(), "/api/daily?days=9223372036854775807").await;
    assert_eq!(payload["days"], 36_500);
    assert_eq!(payload["daily"].as_array().expect("daily").len(), 3);

    let payload = get_json(app, "/api/daily?days=-5").await;
    assert_eq!(payload["days"], 0);
    assert_eq!(payload["daily"].as_array().expect("daily").len(), 1);
}

#[tokio::test]
async fn models_returns_the_cost_sorted_buckets() {
    let payload = get_json(app_with(Some(sample_report())), "/api/models").await;
    let models = payload["models"].as_array().expect("models");
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["key"], "openai/gpt");
    assert_eq!(models[0]["cacheRead"], 0);
}

#[tokio::test]
async fn quotas_includes_providers() {
    let payload = get_json(app_with(Some(sample_report())), "/api/quotas").await;
    assert_eq!(payload["quotas"]["available"], true);
    assert_eq!(payload["quotas"]["raw"], "quota: 42% used");
    assert_eq!(payload["providers"][0]["provider"], "openai");
}

#[tokio::test]
async fn tips_carry_text_and_type() {
    let payload = get_json(app_with(Some(sample_report())), "/api/tips").await;
    let tips = payload["tips"].as_array().expect("tips");
    assert_eq!(tips.len(), 1);
    assert_eq!(tips[0]["type"], "info");
    assert!(
        tips[0]["text"]
            .as_str()
            .expect("text")
            .starts_with("openai/gpt")
    );
}

#[tokio::test]
async fn all_serves_the_full_report() {
    let payload = get_json(app_with(Some(sample_report())), "/api/all").await;
    assert_eq!(payload["summary"]["totalCalls"], 6);
    assert_eq!(payload["daily"].as_array().expect("daily").len(), 3);
    assert_eq!(payload["models"][0]["provider"], "openai");
    assert_eq!(payload["quotas"]["available"], true);
    assert_eq!(payload["updatedAt"], "2025-06-16T10:00:00.000Z");
}

#[tokio::test]
async fn empty_state_serves_the_default_report() {
    let app = app_with(None);
    let payload = get_json(app.clone(), "/api/all").await;
    assert_eq!(payload["summary"]["totalCalls"], 0);
    assert!(payload["daily"].as_array().expect("daily").is_empty());
    assert!(payload["quotas"].is_null());
    assert_eq!(payload["updatedAt"], "");

    let payload = get_json(app, "/api/tips").await;
    assert!(payload["tips"].as_array().expect("tips").is_empty());
}
