//! Time parsing for cluster report output.

use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use std::time::Duration;

use crate::SENTINELS;

/// Parse a naive cluster-local timestamp (YYYY-MM-DDTHH:MM:SS) into
/// signed epoch seconds using the cluster's declared UTC offset.
///
/// Remote clusters run in different zones than the ingestion host, so
/// the host timezone is never consulted. Returns None for empty
/// strings and placeholder values like "Unknown" or "None assigned".
pub fn parse_local_timestamp(s: &str, offset: FixedOffset) -> Option<i64> {
    let trimmed = s.trim();
    if SENTINELS.contains(&trimmed) {
        return None;
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .and_then(|dt| offset.from_local_datetime(&dt).single())
        .map(|dt| dt.timestamp())
}

/// Parse a scheduler duration in various formats.
///
/// Supports:
/// - D-HH:MM:SS (time limit with days)
/// - HH:MM:SS
/// - MM:SS
/// - Seconds as integer
///
/// Returns None for "UNLIMITED" or placeholder strings.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if SENTINELS.contains(&s) || s == "UNLIMITED" {
        return None;
    }

    // Check for day separator (D-HH:MM:SS)
    let parts: Vec<&str> = s.split('-').collect();
    let (days, time_part) = if parts.len() == 2 {
        (parts[0].parse::<u64>().unwrap_or(0), parts[1])
    } else {
        (0, parts[0])
    };

    let time_parts: Vec<u64> = time_part
        .split(':')
        .filter_map(|p| p.parse().ok())
        .collect();

    let seconds = match time_parts.len() {
        3 => time_parts[0] * 3600 + time_parts[1] * 60 + time_parts[2],
        2 => time_parts[0] * 60 + time_parts[1],
        1 => time_parts[0],
        _ => return None,
    };

    Some(Duration::from_secs(days * 86400 + seconds))
}

/// Like `parse_duration` but returns seconds as u64.
pub fn parse_duration_secs(s: &str) -> Option<u64> {
    parse_duration(s).map(|d| d.as_secs())
}

/// Parse an exit code string "code:signal" into (code, signal).
///
/// A zero signal means the job was not signalled.
pub fn parse_exit_code(s: &str) -> (i32, Option<i32>) {
    let parts: Vec<&str> = s.split(':').collect();
    let code = parts.first().and_then(|p| p.parse().ok()).unwrap_or(0);
    let signal = parts
        .get(1)
        .and_then(|p| p.parse().ok())
        .filter(|&sig| sig != 0);
    (code, signal)
}
