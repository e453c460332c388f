mod parser;
mod paths;
mod scanner;
mod types;

pub use parser::{extract_usage_record_from_line, usage_records_from_reader};
pub use paths::{default_openclaw_home, pricing_config_path, sessions_dir};
pub use scanner::{FileScan, ScanOutcome, scan_file, scan_sessions};
pub use types::{IngestError, Result, ScanIssue, ScanStats};
