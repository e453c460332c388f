use monitor_app::SnapshotCell;

/// The serving layer only ever reads the latest committed report; it holds
/// the snapshot cell and nothing else.
#[derive(Clone)]
pub struct HttpState {
    pub snapshot: SnapshotCell,
}

impl HttpState {
    pub fn new(snapshot: SnapshotCell) -> Self {
        Self { snapshot }
    }
}
