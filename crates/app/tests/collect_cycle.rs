use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use monitor_app::{AppConfig, AppState, CollectOutcome, CollectSummary};
use tempfile::{TempDir, tempdir};

fn usage_line(ts: &str, provider: &str, model: &str, cost: f64, tokens: u64) -> String {
    format!(
        r#"{{"type":"message","timestamp":"{ts}","message":{{"role":"assistant","provider":"{provider}","model":"{model}","usage":{{"input":100,"output":20,"cacheRead":0,"cacheWrite":0,"totalTokens":{tokens},"cost":{{"total":{cost},"input":0.0,"output":{cost}}}}}}}}}"#
    )
}

struct TestHome {
    _dir: TempDir,
    home: PathBuf,
    cache_path: PathBuf,
}

fn test_home() -> TestHome {
    let dir = tempdir().expect("tempdir");
    let home = dir.path().join("openclaw");
    let sessions = home.join("agents").join("main").join("sessions");
    fs::create_dir_all(&sessions).expect("sessions dir");
    fs::write(
        sessions.join("session-a.jsonl"),
        format!(
            "{}\n{}\n",
            usage_line("2025-06-16T12:00:00Z", "openai", "gpt", 0.1, 100),
            usage_line("2025-06-16T12:00:00Z", "anthropic", "claude", 0.2, 50),
        ),
    )
    .expect("write log");
    fs::write(
        home.join("openclaw.json"),
        r#"{"models":{"providers":{"openai":{"models":[{"id":"gpt","cost":{"input":2.0,"output":8.0}}]}}}}"#,
    )
    .expect("write pricing");
    let cache_path = dir.path().join("data").join("cache.json");
    TestHome {
        _dir: dir,
        home,
        cache_path,
    }
}

fn state_with_quota_command(home: &TestHome, quota_command: &str) -> AppState {
    let mut config = AppConfig::new(home.home.clone(), home.cache_path.clone());
    config.quota_command = quota_command.to_string();
    AppState::new(config)
}

fn state(home: &TestHome) -> AppState {
    // A program name that cannot resolve, so quota fetch takes the
    // unavailable path without touching the host system.
    state_with_quota_command(home, "openclaw-monitor-test-no-such-command")
}

fn completed(outcome: CollectOutcome) -> CollectSummary {
    match outcome {
        CollectOutcome::Completed(summary) => summary,
        CollectOutcome::Skipped => panic!("cycle was skipped"),
    }
}

#[test]
fn collect_commits_a_report_and_persists_the_cache() {
    let home = test_home();
    let state = state(&home);

    let summary = completed(state.collect());
    assert_eq!(summary.total_calls, 2);
    assert!((summary.total_cost - 0.3).abs() < 1e-9);
    assert_eq!(summary.records_extracted, 2);
    assert_eq!(summary.files_scanned, 1);

    let report = state.snapshot.latest();
    assert_eq!(report.summary.total_calls, 2);
    assert_eq!(report.models.len(), 2);
    assert_eq!(report.models[0].key, "anthropic/claude");
    assert!(report.pricing.contains_key("openai/gpt"));
    assert!(!report.tips.is_empty());
    assert!(!report.updated_at.is_empty());

    let quotas = report.quotas.as_ref().expect("quota report");
    assert!(!quotas.available);
    assert!(quotas.error.is_some());

    assert!(home.cache_path.exists());
}

#[test]
fn second_collect_without_growth_adds_nothing() {
    let home = test_home();
    let state = state(&home);

    completed(state.collect());
    let summary = completed(state.collect());
    assert_eq!(summary.records_extracted, 0);
    assert_eq!(summary.total_calls, 2);
    assert!((summary.total_cost - 0.3).abs() < 1e-9);
}

#[test]
fn appended_lines_are_picked_up_incrementally() {
    let home = test_home();
    let state = state(&home);
    completed(state.collect());

    let log = home
        .home
        .join("agents")
        .join("main")
        .join("sessions")
        .join("session-a.jsonl");
    let mut file = OpenOptions::new()
        .append(true)
        .open(&log)
        .expect("open for append");
    writeln!(
        file,
        "{}",
        usage_line("2025-06-16T12:00:00Z", "openai", "gpt", 0.05, 25)
    )
    .expect("append");

    let summary = completed(state.collect());
    assert_eq!(summary.records_extracted, 1);
    assert_eq!(summary.total_calls, 3);
    assert!((summary.total_cost - 0.35).abs() < 1e-9);
}

#[test]
fn restart_primes_the_cell_from_the_cache() {
    let home = test_home();
    let first = state(&home);
    completed(first.collect());
    drop(first);

    let second = state(&home);
    assert_eq!(second.snapshot.latest().summary.total_calls, 0);
    second.prime();

    let report = second.snapshot.latest();
    assert_eq!(report.summary.total_calls, 2);
    assert!(!report.updated_at.is_empty());

    // Primed offsets mean the next cycle scans nothing new.
    let summary = completed(second.collect());
    assert_eq!(summary.records_extracted, 0);
    assert_eq!(summary.total_calls, 2);
}

#[test]
fn absent_session_directory_yields_the_empty_report() {
    let dir = tempdir().expect("tempdir");
    let home = TestHome {
        home: dir.path().join("missing-home"),
        cache_path: dir.path().join("cache.json"),
        _dir: dir,
    };
    let state = state(&home);

    let summary = completed(state.collect());
    assert_eq!(summary.total_calls, 0);
    let report = state.snapshot.latest();
    assert_eq!(report.tips.len(), 1);
    assert_eq!(report.tips[0].text, "No usage data yet");
}

#[test]
fn corrupt_cache_degrades_to_an_empty_start() {
    let home = test_home();
    fs::create_dir_all(home.cache_path.parent().expect("parent")).expect("mkdir");
    fs::write(&home.cache_path, "{not json").expect("write corrupt cache");

    let state = state(&home);
    state.prime();
    assert_eq!(state.snapshot.latest().summary.total_calls, 0);

    // The next collect rescans from offset zero and overwrites the file.
    let summary = completed(state.collect());
    assert_eq!(summary.records_extracted, 2);
}

#[cfg(unix)]
mod quota_commands {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::{Duration, Instant};

    fn stub_command(dir: &Path, body: &str) -> String {
        let path = dir.join("openclaw-stub.sh");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write stub");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path.to_string_lossy().to_string()
    }

    #[test]
    fn structured_quota_output_lands_in_report() {
        let home = test_home();
        let stub = stub_command(home.home.as_path(), r#"echo '{"plans":[{"used":5}]}'"#);
        let state = state_with_quota_command(&home, &stub);

        let quotas = state.services.quotas.fetch();
        assert!(quotas.available);
        let report = quotas.report.expect("structured report");
        assert_eq!(report["plans"][0]["used"], 5);
        assert!(quotas.raw.is_none());
    }

    #[test]
    fn plain_text_output_falls_back_to_raw() {
        let home = test_home();
        // Fails when asked for JSON, succeeds in plain-text form.
        let stub = stub_command(
            home.home.as_path(),
            r#"for arg in "$@"; do [ "$arg" = "--json" ] && exit 1; done
echo "quota: 42% used""#,
        );
        let state = state_with_quota_command(&home, &stub);

        let quotas = state.services.quotas.fetch();
        assert!(quotas.available);
        assert!(quotas.report.is_none());
        assert_eq!(quotas.raw.as_deref(), Some("quota: 42% used"));
    }

    #[test]
    fn failing_command_yields_the_unavailable_marker() {
        let home = test_home();
        let stub = stub_command(home.home.as_path(), "exit 7");
        let state = state_with_quota_command(&home, &stub);

        let quotas = state.services.quotas.fetch();
        assert!(!quotas.available);
        assert_eq!(
            quotas.error.as_deref(),
            Some("could not fetch provider quotas")
        );
    }

    #[test]
    fn slow_command_is_killed_at_the_deadline() {
        let home = test_home();
        let stub = stub_command(home.home.as_path(), "sleep 30");
        let state = state_with_quota_command(&home, &stub);

        let started = Instant::now();
        let quotas = state
            .services
            .quotas
            .fetch_with_timeout(Duration::from_millis(200));
        assert!(!quotas.available);
        // Both tiers run; well under the 30 s sleep either way.
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
