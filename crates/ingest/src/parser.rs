use chrono::{DateTime, SecondsFormat, Utc};
use monitor_core::UsageRecord;
use serde_json::Value;

pub(crate) fn parse_json_line(line: &str) -> Option<Value> {
    serde_json::from_str(line).ok()
}

fn normalize_timestamp(raw: &str) -> Option<String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            parsed
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        let dt = DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc);
        return Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        let dt = DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc);
        return Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true));
    }
    if raw.chars().all(|ch| ch.is_ascii_digit())
        && let Ok(value) = raw.parse::<i64>()
    {
        let (secs, nanos) = if raw.len() > 10 {
            (
                value / 1000,
                (value % 1000).unsigned_abs() as u32 * 1_000_000,
            )
        } else {
            (value, 0)
        };
        if let Some(dt) = DateTime::<Utc>::from_timestamp(secs, nanos) {
            return Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true));
        }
    }
    None
}

fn extract_timestamp(obj: &Value) -> Option<String> {
    let raw = obj.get("timestamp")?;
    if let Some(text) = raw.as_str() {
        return normalize_timestamp(text);
    }
    if let Some(number) = raw.as_i64() {
        return normalize_timestamp(&number.to_string());
    }
    None
}

fn string_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn u64_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn f64_field(value: Option<&Value>, key: &str) -> f64 {
    value
        .and_then(|cost| cost.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Decodes one log line into a usage record. Returns `None` for anything that
/// is not a qualifying assistant completion: invalid JSON, wrong entry shape,
/// an unnormalizable timestamp, or totally zero usage.
pub fn extract_usage_record_from_line(line: &str) -> Option<UsageRecord> {
    let obj = parse_json_line(line)?;
    extract_usage_record_from_value(&obj)
}

pub(crate) fn extract_usage_record_from_value(obj: &Value) -> Option<UsageRecord> {
    if obj.get("type")?.as_str()? != "message" {
        return None;
    }
    let message = obj.get("message")?;
    if string_field(message, "role")? != "assistant" {
        return None;
    }
    let usage = message.get("usage")?;
    if !usage.is_object() {
        return None;
    }
    let timestamp = extract_timestamp(obj)?;
    let cost = usage.get("cost");

    let record = UsageRecord {
        timestamp,
        provider: string_field(message, "provider")
            .unwrap_or("unknown")
            .to_string(),
        model: string_field(message, "model")
            .unwrap_or("unknown")
            .to_string(),
        input: u64_field(usage, "input"),
        output: u64_field(usage, "output"),
        cache_read: u64_field(usage, "cacheRead"),
        cache_write: u64_field(usage, "cacheWrite"),
        total_tokens: u64_field(usage, "totalTokens"),
        cost: f64_field(cost, "total"),
        cost_input: f64_field(cost, "input"),
        cost_output: f64_field(cost, "output"),
    };
    if record.total_tokens == 0 && record.cost == 0.0 {
        return None;
    }
    Some(record)
}

/// Extracts every qualifying record from a line-oriented reader, in line
/// order. Lines that fail to decode are skipped.
pub fn usage_records_from_reader<R: std::io::BufRead>(reader: R) -> Vec<UsageRecord> {
    reader
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| extract_usage_record_from_line(&line))
        .collect()
}
