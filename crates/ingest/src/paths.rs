use std::path::{Path, PathBuf};

pub fn default_openclaw_home() -> PathBuf {
    if let Ok(path) = std::env::var("OPENCLAW_HOME") {
        return PathBuf::from(path);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".openclaw");
    }
    PathBuf::from(".openclaw")
}

/// Flat directory of `*.jsonl` session logs under the OpenClaw home.
pub fn sessions_dir(home: &Path) -> PathBuf {
    home.join("agents").join("main").join("sessions")
}

pub fn pricing_config_path(home: &Path) -> PathBuf {
    home.join("openclaw.json")
}
