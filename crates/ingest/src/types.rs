use serde::Serialize;
use std::io;

/// Scan summary returned after walking the session directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    pub files_seen: usize,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub records_extracted: usize,
    pub bytes_read: u64,
    pub issues: Vec<ScanIssue>,
}

/// Non-fatal issues encountered while scanning one file.
#[derive(Debug, Clone, Serialize)]
pub struct ScanIssue {
    pub file: String,
    pub message: String,
}

/// Errors emitted by the scanning entry points.
#[derive(Debug)]
pub enum IngestError {
    Io(io::Error),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<io::Error> for IngestError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
