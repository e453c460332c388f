use std::path::PathBuf;

const DATA_DIR_NAME: &str = "openclaw-monitor";
const LEGACY_DIR_NAME: &str = ".openclaw-monitor";
const CACHE_FILE_NAME: &str = "cache.json";

#[derive(Debug, Clone)]
pub struct DataDirResolution {
    pub dir: PathBuf,
    pub matched_existing: bool,
}

/// A legacy `~/.openclaw-monitor` that already holds a cache keeps winning so
/// an upgrade does not silently restart from empty state.
pub fn resolve_data_dir() -> Result<DataDirResolution, String> {
    let home = std::env::var("HOME").map_err(|err| format!("resolve HOME: {}", err))?;
    let home = PathBuf::from(home);

    let legacy = home.join(LEGACY_DIR_NAME);
    if legacy.join(CACHE_FILE_NAME).exists() {
        return Ok(DataDirResolution {
            dir: legacy,
            matched_existing: true,
        });
    }

    let base = match std::env::var("XDG_DATA_HOME") {
        Ok(value) if !value.is_empty() => PathBuf::from(value),
        _ => home.join(".local").join("share"),
    };
    Ok(DataDirResolution {
        dir: base.join(DATA_DIR_NAME),
        matched_existing: false,
    })
}
