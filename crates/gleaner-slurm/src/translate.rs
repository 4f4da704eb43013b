//! Field translation: raw report entries into normalized records.
//!
//! Sentinel strings die here, timestamps are converted with the
//! cluster's declared offset, and GRES strings become descriptors.
//! Nothing downstream of this module ever sees an upstream
//! placeholder value.

use crate::acct::AcctEntry;
use crate::types::{JobState, NormalizedJob, NormalizedNode, RawObject};
use gleaner_core::{gpu_display_name, ClusterContext};
use gleaner_parsers::{
    feature_memory_gb, non_empty_string, parse_duration_secs, parse_gres, parse_local_timestamp,
    parse_memory_mb, MemoryFormat, SENTINELS,
};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Missing required field {field:?}")]
    MissingField { field: &'static str },
    #[error("Field {field:?} is not numeric: {value:?}")]
    BadNumber { field: &'static str, value: String },
    #[error("Field {field:?} is not a timestamp: {value:?}")]
    BadTimestamp { field: &'static str, value: String },
}

fn is_sentinel(s: &str) -> bool {
    SENTINELS.contains(&s.trim())
}

/// Optional string field: sentinels and null map to None, numbers are
/// stringified (job identifiers are strings to us even when the
/// source emits them as numbers).
fn opt_string(fields: &RawObject, key: &str) -> Option<String> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => non_empty_string(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(_) => None,
    }
}

/// Optional identifier field: like `opt_string`, but a numeric zero
/// means "not an array job" and maps to None.
fn opt_id(fields: &RawObject, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::Number(n)) if n.as_i64() == Some(0) => None,
        _ => opt_string(fields, key),
    }
}

fn opt_i64(fields: &RawObject, key: &'static str) -> Result<Option<i64>, TranslateError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| TranslateError::BadNumber {
                field: key,
                value: n.to_string(),
            }),
        Some(Value::String(s)) if is_sentinel(s) => Ok(None),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| {
            TranslateError::BadNumber {
                field: key,
                value: s.clone(),
            }
        }),
        Some(other) => Err(TranslateError::BadNumber {
            field: key,
            value: other.to_string(),
        }),
    }
}

/// Timestamp field: the source emits either epoch numbers (zero for
/// "not set") or naive cluster-local strings.
fn opt_timestamp(
    fields: &RawObject,
    key: &'static str,
    ctx: &ClusterContext,
) -> Result<Option<i64>, TranslateError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(None),
            Some(ts) => Ok(Some(ts)),
            None => Err(TranslateError::BadTimestamp {
                field: key,
                value: n.to_string(),
            }),
        },
        Some(Value::String(s)) if is_sentinel(s) => Ok(None),
        Some(Value::String(s)) => parse_local_timestamp(s, ctx.offset)
            .map(Some)
            .ok_or_else(|| TranslateError::BadTimestamp {
                field: key,
                value: s.clone(),
            }),
        Some(other) => Err(TranslateError::BadTimestamp {
            field: key,
            value: other.to_string(),
        }),
    }
}

/// Time limit in seconds. The one numeric field allowed to fall back
/// to zero: the source leaves it unset for jobs with no limit.
fn time_limit_secs(fields: &RawObject) -> Result<u64, TranslateError> {
    match fields.get("time_limit") {
        None | Some(Value::Null) => Ok(0),
        // Numeric limits are scheduler minutes.
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|minutes| minutes * 60)
            .ok_or_else(|| TranslateError::BadNumber {
                field: "time_limit",
                value: n.to_string(),
            }),
        Some(Value::String(s)) if is_sentinel(s) || s == "UNLIMITED" => Ok(0),
        Some(Value::String(s)) => {
            parse_duration_secs(s).ok_or_else(|| TranslateError::BadNumber {
                field: "time_limit",
                value: s.clone(),
            })
        }
        Some(other) => Err(TranslateError::BadNumber {
            field: "time_limit",
            value: other.to_string(),
        }),
    }
}

/// Pull one resource tally out of the tres sub-document.
///
/// An empty or missing list is a valid state (a pending job has no
/// allocation yet) and tallies to zero; a missing tres document
/// entirely is schema drift surfaced as an error.
fn tres_count(fields: &RawObject, list: &str, kind: &str) -> Result<u64, TranslateError> {
    let tres = fields
        .get("tres")
        .and_then(Value::as_object)
        .ok_or(TranslateError::MissingField { field: "tres" })?;
    let entries = match tres.get(list).and_then(Value::as_array) {
        Some(entries) => entries,
        None => return Ok(0),
    };
    for entry in entries {
        let entry_type = entry.get("type").and_then(Value::as_str).unwrap_or("");
        let matches = if kind == "gpu" {
            entry_type == "gres"
                && entry.get("name").and_then(Value::as_str) == Some("gpu")
        } else {
            entry_type == kind
        };
        if matches {
            return Ok(entry.get("count").and_then(Value::as_u64).unwrap_or(0));
        }
    }
    Ok(0)
}

/// Translate one accounting entry into a normalized job.
pub fn translate_job(
    entry: &AcctEntry,
    ctx: &ClusterContext,
) -> Result<NormalizedJob, TranslateError> {
    let fields = &entry.fields;

    let job_id =
        opt_string(fields, "job_id").ok_or(TranslateError::MissingField { field: "job_id" })?;
    let state_str =
        opt_string(fields, "state").ok_or(TranslateError::MissingField { field: "state" })?;

    Ok(NormalizedJob {
        job_id,
        array_job_id: opt_id(fields, "array_job_id"),
        array_task_id: opt_id(fields, "array_task_id"),
        cluster_name: ctx.name().to_string(),
        state: JobState::parse(&state_str),
        state_reason: opt_string(fields, "state_reason"),
        exit_code: opt_i64(fields, "exit_code")?.map(|code| code as i32),
        username: opt_string(fields, "username"),
        account: opt_string(fields, "account"),
        partition: opt_string(fields, "partition"),
        nodes: opt_string(fields, "nodes"),
        submit_time: opt_timestamp(fields, "submit_time", ctx)?,
        start_time: opt_timestamp(fields, "start_time", ctx)?,
        end_time: opt_timestamp(fields, "end_time", ctx)?,
        eligible_time: opt_timestamp(fields, "eligible_time", ctx)?,
        time_limit_secs: time_limit_secs(fields)?,
        req_cpus: tres_count(fields, "requested", "cpu")?,
        req_mem_mb: tres_count(fields, "requested", "mem")?,
        req_gpus: tres_count(fields, "requested", "gpu")?,
        alloc_cpus: tres_count(fields, "allocated", "cpu")?,
        alloc_mem_mb: tres_count(fields, "allocated", "mem")?,
        alloc_gpus: tres_count(fields, "allocated", "gpu")?,
        node_count: opt_i64(fields, "node_count")?.unwrap_or(0).max(0) as u64,
        work_dir: opt_string(fields, "working_directory"),
        command: opt_string(fields, "command"),
        flags: opt_string(fields, "flags"),
    })
}

fn node_str<'a>(
    record: &'a BTreeMap<String, String>,
    key: &'static str,
) -> Result<&'a str, TranslateError> {
    record
        .get(key)
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or(TranslateError::MissingField { field: key })
}

fn node_u64(record: &BTreeMap<String, String>, key: &'static str) -> Result<u64, TranslateError> {
    let value = node_str(record, key)?;
    value.trim().parse().map_err(|_| TranslateError::BadNumber {
        field: key,
        value: value.to_string(),
    })
}

/// Memory fields may arrive as plain MB or with a unit suffix
/// depending on which status tool version produced the report.
fn node_memory_mb(
    record: &BTreeMap<String, String>,
    key: &'static str,
) -> Result<u64, TranslateError> {
    let value = node_str(record, key)?;
    parse_memory_mb(value, MemoryFormat::Status).ok_or_else(|| TranslateError::BadNumber {
        field: key,
        value: value.to_string(),
    })
}

/// Translate one status report record into a normalized node.
pub fn translate_node(
    record: &BTreeMap<String, String>,
    ctx: &ClusterContext,
) -> Result<NormalizedNode, TranslateError> {
    let name = node_str(record, "NodeName")?.to_string();
    let state = node_str(record, "StateLong")?.to_lowercase();

    let partitions = record
        .get("Partitions")
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let features = record
        .get("AvailableFeatures")
        .and_then(|s| non_empty_string(s));
    let gres = record.get("Gres").and_then(|s| parse_gres(s));

    // A model reported at a larger memory capacity than its base
    // variant gets the suffixed display name.
    let gpu_display_name = gres.as_ref().map(|descriptor| {
        features
            .as_deref()
            .and_then(feature_memory_gb)
            .and_then(|gb| gpu_display_name(&descriptor.name, gb))
            .unwrap_or(descriptor.name.as_str())
            .to_string()
    });

    Ok(NormalizedNode {
        name,
        cluster_name: ctx.name().to_string(),
        state,
        partitions,
        cpus_total: node_u64(record, "CPUTot")?,
        cpus_alloc: node_u64(record, "CPUAlloc")?,
        memory_mb_total: node_memory_mb(record, "Memory")?,
        memory_mb_alloc: node_memory_mb(record, "AllocMem")?,
        sockets: node_u64(record, "Sockets")?,
        cores_per_socket: node_u64(record, "CoresPerSocket")?,
        gres,
        gpu_display_name,
        features,
        reservation: record
            .get("ReservationName")
            .and_then(|s| non_empty_string(s)),
        reason: record.get("Reason").and_then(|s| non_empty_string(s)),
    })
}
