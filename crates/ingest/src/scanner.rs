use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use monitor_core::{ScanState, UsageRecord};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::parser::extract_usage_record_from_line;
use crate::types::{Result, ScanIssue, ScanStats};

/// Records and bytes consumed from a single session file.
#[derive(Debug)]
pub struct FileScan {
    pub records: Vec<UsageRecord>,
    pub bytes_read: u64,
    /// A mid-file read error; the bytes consumed before it are still counted.
    pub issue: Option<String>,
}

/// Result of one pass over the session directory.
#[derive(Debug)]
pub struct ScanOutcome {
    pub records: Vec<UsageRecord>,
    pub offsets: ScanState,
    pub stats: ScanStats,
}

fn is_session_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|value| value.to_str()),
        Some("jsonl")
    )
}

struct FileTask {
    path: PathBuf,
    file_name: String,
    start_offset: u64,
}

struct ParsedFile {
    file_name: String,
    start_offset: u64,
    bytes_read: u64,
    records: Vec<UsageRecord>,
    issues: Vec<ScanIssue>,
    skipped: bool,
}

fn parse_task(task: FileTask) -> ParsedFile {
    match scan_file(&task.path, task.start_offset) {
        Ok(scan) => {
            let issues = scan
                .issue
                .map(|message| ScanIssue {
                    file: task.file_name.clone(),
                    message,
                })
                .into_iter()
                .collect();
            ParsedFile {
                file_name: task.file_name,
                start_offset: task.start_offset,
                bytes_read: scan.bytes_read,
                records: scan.records,
                issues,
                skipped: false,
            }
        }
        Err(err) => ParsedFile {
            issues: vec![ScanIssue {
                file: task.file_name.clone(),
                message: err.to_string(),
            }],
            file_name: task.file_name,
            start_offset: task.start_offset,
            bytes_read: 0,
            records: Vec::new(),
            skipped: true,
        },
    }
}

/// Extracts the usage records found strictly after `start_offset`. The byte
/// seek is exact, so repeated calls never re-read consumed bytes, and
/// `bytes_read` counts everything consumed through `read_line` -- a file read
/// to EOF yields `start_offset + bytes_read == file size` even when the last
/// line was garbage.
pub fn scan_file(path: &Path, start_offset: u64) -> Result<FileScan> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(start_offset))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();
    let mut bytes_read = 0u64;
    let mut records = Vec::new();
    let mut issue = None;

    loop {
        buf.clear();
        match reader.read_line(&mut buf) {
            Ok(0) => break,
            Ok(bytes) => {
                bytes_read = bytes_read.saturating_add(bytes as u64);
                let line = buf.trim_end_matches(['\n', '\r']);
                if line.is_empty() {
                    continue;
                }
                if let Some(record) = extract_usage_record_from_line(line) {
                    records.push(record);
                }
            }
            Err(err) => {
                issue = Some(err.to_string());
                break;
            }
        }
    }

    Ok(FileScan {
        records,
        bytes_read,
        issue,
    })
}

/// Walks the session directory, scans the unread range of every `*.jsonl`
/// file, and merges the extracted records into the accumulated set. An absent
/// directory returns the previous state unchanged; an unreadable file is
/// recorded as an issue and keeps its old offset while the rest of the pass
/// proceeds. Files are parsed in parallel and merged in enumeration order so
/// the accumulated record order stays deterministic.
pub fn scan_sessions(
    sessions_dir: &Path,
    offsets: ScanState,
    records: Vec<UsageRecord>,
) -> ScanOutcome {
    let mut stats = ScanStats::default();
    let mut offsets = offsets;
    let mut records = records;

    if !sessions_dir.is_dir() {
        return ScanOutcome {
            records,
            offsets,
            stats,
        };
    }

    let mut tasks = Vec::new();
    for entry in WalkDir::new(sessions_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let file = err
                    .path()
                    .and_then(|path| path.file_name())
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                stats.issues.push(ScanIssue {
                    file,
                    message: err.to_string(),
                });
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_session_path(path) {
            continue;
        }
        stats.files_seen += 1;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                stats.files_skipped += 1;
                stats.issues.push(ScanIssue {
                    file: file_name,
                    message: err.to_string(),
                });
                continue;
            }
        };
        let start_offset = offsets.get(&file_name).copied().unwrap_or(0);
        if metadata.len() <= start_offset {
            // Untouched since the last pass, or shrunk; either way there is
            // nothing safe to read.
            stats.files_skipped += 1;
            continue;
        }
        tasks.push(FileTask {
            path: path.to_path_buf(),
            file_name,
            start_offset,
        });
    }

    let parsed_files = tasks
        .into_par_iter()
        .map(parse_task)
        .collect::<Vec<_>>();

    for parsed in parsed_files {
        stats.issues.extend(parsed.issues);
        if parsed.skipped {
            stats.files_skipped += 1;
            continue;
        }
        stats.files_scanned += 1;
        stats.bytes_read += parsed.bytes_read;
        stats.records_extracted += parsed.records.len();
        offsets.insert(
            parsed.file_name,
            parsed.start_offset.saturating_add(parsed.bytes_read),
        );
        records.extend(parsed.records);
    }

    ScanOutcome {
        records,
        offsets,
        stats,
    }
}
