use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use monitor_core::QuotaReport;
use serde_json::Value;

use crate::services::SharedConfig;

const QUOTA_TIMEOUT: Duration = Duration::from_secs(15);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Fetches provider quota state from the external CLI. Two tiers: structured
/// `--json` output first, then the plain-text form captured raw. When both
/// fail the report carries an explicit unavailable marker instead of an
/// error; a refresh cycle never aborts over quotas.
#[derive(Clone)]
pub struct QuotaService {
    config: SharedConfig,
}

impl QuotaService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn fetch(&self) -> QuotaReport {
        self.fetch_with_timeout(QUOTA_TIMEOUT)
    }

    pub fn fetch_with_timeout(&self, deadline: Duration) -> QuotaReport {
        let command = self.config.quota_command.as_str();

        if let Some(output) = run_quota_command(command, &["status", "--usage", "--json"], deadline)
        {
            if let Ok(report) = serde_json::from_str::<Value>(&output) {
                return QuotaReport {
                    available: true,
                    report: Some(report),
                    raw: None,
                    error: None,
                };
            }
        }

        if let Some(output) = run_quota_command(command, &["status", "--usage"], deadline) {
            let trimmed = output.trim();
            if !trimmed.is_empty() {
                return QuotaReport {
                    available: true,
                    report: None,
                    raw: Some(trimmed.to_string()),
                    error: None,
                };
            }
        }

        QuotaReport {
            available: false,
            report: None,
            raw: None,
            error: Some("could not fetch provider quotas".to_string()),
        }
    }
}

/// Runs the command with stderr discarded and a hard deadline. Stdout is
/// drained on a helper thread; a child that fills the pipe would otherwise
/// never exit and stall the poll loop. `None` covers spawn failure, nonzero
/// exit, and the deadline kill alike.
fn run_quota_command(program: &str, args: &[&str], deadline: Duration) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;
    let mut stdout = child.stdout.take()?;
    let reader = thread::spawn(move || {
        let mut output = String::new();
        let _ = stdout.read_to_string(&mut output);
        output
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if started.elapsed() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = reader.join();
                    return None;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = reader.join();
                return None;
            }
        }
    };

    let output = reader.join().ok()?;
    if status.success() { Some(output) } else { None }
}
