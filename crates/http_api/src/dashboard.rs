use std::path::PathBuf;

pub fn resolve_dashboard_dir() -> PathBuf {
    let env_override = std::env::var_os("OPENCLAW_MONITOR_DASHBOARD").map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from));
    resolve_dashboard_dir_with(env_override, exe_dir)
}

fn resolve_dashboard_dir_with(env_override: Option<PathBuf>, exe_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override {
        return dir;
    }
    if let Some(dir) = exe_dir {
        let candidate = dir.join("dashboard");
        if candidate.is_dir() {
            return candidate;
        }
    }
    PathBuf::from("dashboard")
}
