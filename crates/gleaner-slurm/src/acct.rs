//! Structured job accounting report parsing.
//!
//! The accounting command emits one JSON document with a `jobs` list.
//! Each entry's fields are routed through the handler table; the
//! output per job is the verbatim entry (for the raw partition) plus
//! a flattened field map for translation.

use crate::handlers::{job_field_handler, FieldHandler};
use crate::types::RawObject;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcctError {
    #[error("Failed to parse accounting report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Accounting report has no \"jobs\" list")]
    MissingJobs,
    #[error("Accounting entry {index} is not an object")]
    NotAnObject { index: usize },
    #[error("Unknown field {field:?} in accounting entry {index}; schema has drifted")]
    UnknownField { index: usize, field: String },
    #[error("Field {field:?} in accounting entry {index} is not a {expected}")]
    BadFieldShape {
        index: usize,
        field: String,
        expected: &'static str,
    },
}

/// One parsed accounting entry: the raw object verbatim, plus the
/// flattened fields the handlers produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AcctEntry {
    pub raw: RawObject,
    pub fields: RawObject,
}

fn expand_subitems(
    value: &Value,
    subitems: &[(&str, &str)],
    index: usize,
    field: &str,
    out: &mut RawObject,
) -> Result<(), AcctError> {
    let object = value.as_object().ok_or_else(|| AcctError::BadFieldShape {
        index,
        field: field.to_string(),
        expected: "object",
    })?;
    for (sub, output) in subitems {
        let sub_value = object.get(*sub).cloned().unwrap_or(Value::Null);
        out.insert(output.to_string(), sub_value);
    }
    Ok(())
}

fn join_subitems(
    value: &Value,
    separator: &str,
    index: usize,
    field: &str,
) -> Result<String, AcctError> {
    let items = value.as_array().ok_or_else(|| AcctError::BadFieldShape {
        index,
        field: field.to_string(),
        expected: "list",
    })?;
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    Ok(parts.join(separator))
}

/// Parse one structured accounting report.
///
/// Pure function of its input: no I/O, entries in encounter order.
/// An unrecognized field name in any entry is fatal for the whole
/// report; nothing after it is parsed.
pub fn parse_acct_report(text: &str) -> Result<Vec<AcctEntry>, AcctError> {
    let document: Value = serde_json::from_str(text)?;
    let jobs = document
        .get("jobs")
        .and_then(Value::as_array)
        .ok_or(AcctError::MissingJobs)?;

    let mut entries = Vec::with_capacity(jobs.len());
    for (index, job) in jobs.iter().enumerate() {
        let raw = job
            .as_object()
            .ok_or(AcctError::NotAnObject { index })?
            .clone();

        let mut fields = RawObject::new();
        for (name, value) in &raw {
            match job_field_handler(name) {
                None => {
                    return Err(AcctError::UnknownField {
                        index,
                        field: name.clone(),
                    });
                }
                Some(FieldHandler::Copy) => {
                    fields.insert(name.clone(), value.clone());
                }
                Some(FieldHandler::Rename(output)) => {
                    fields.insert(output.to_string(), value.clone());
                }
                Some(FieldHandler::Ignore) => {}
                Some(FieldHandler::ExpandSubitems(subitems)) => {
                    expand_subitems(value, subitems, index, name, &mut fields)?;
                }
                Some(FieldHandler::JoinSubitems { separator, output }) => {
                    let joined = join_subitems(value, separator, index, name)?;
                    fields.insert(output.to_string(), Value::String(joined));
                }
            }
        }
        entries.push(AcctEntry { raw, fields });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(jobs: Value) -> String {
        json!({ "jobs": jobs }).to_string()
    }

    #[test]
    fn test_parse_acct_report() {
        let text = report(json!([{
            "job_id": 123456,
            "name": "train.sh",
            "account": "rrg-lab",
            "user": "jdoe",
            "partition": "gpu",
            "nodes": "cn-c[017-018]",
            "allocation_nodes": 2,
            "array": {"job_id": 0, "task_id": null},
            "state": {"current": "RUNNING", "reason": "None"},
            "exit_code": {"status": "SUCCESS", "return_code": 0},
            "time": {"submission": 1620500000, "start": 1620500100,
                     "end": 0, "eligible": 1620500000, "limit": 720},
            "tres": {"requested": [], "allocated": []},
            "flags": ["CLEAR_SCHEDULING", "STARTED_ON_BACKFILL"],
            "working_directory": "/home/jdoe/proj",
            "group": "jdoe",
            "qos": "normal",
            "priority": 4294000000u64,
            "steps": []
        }]));

        let entries = parse_acct_report(&text).unwrap();
        assert_eq!(entries.len(), 1);

        let fields = &entries[0].fields;
        // Copy and rename
        assert_eq!(fields["job_id"], json!(123456));
        assert_eq!(fields["command"], json!("train.sh"));
        assert_eq!(fields["username"], json!("jdoe"));
        assert_eq!(fields["node_count"], json!(2));
        // Expanded sub-objects
        assert_eq!(fields["state"], json!("RUNNING"));
        assert_eq!(fields["submit_time"], json!(1620500000));
        assert_eq!(fields["exit_code"], json!(0));
        // Joined list
        assert_eq!(
            fields["flags"],
            json!("CLEAR_SCHEDULING,STARTED_ON_BACKFILL")
        );
        // Ignored fields do not leak through
        assert!(!fields.contains_key("priority"));
        assert!(!fields.contains_key("steps"));
        // Raw entry is untouched
        assert_eq!(entries[0].raw["name"], json!("train.sh"));
        assert!(entries[0].raw.contains_key("priority"));
    }

    #[test]
    fn test_unknown_field_is_fatal() {
        let text = report(json!([
            {"job_id": 1, "gpu_teleportation": true},
            {"job_id": 2}
        ]));
        let err = parse_acct_report(&text).unwrap_err();
        match err {
            AcctError::UnknownField { index, field } => {
                assert_eq!(index, 0);
                assert_eq!(field, "gpu_teleportation");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_jobs_list() {
        assert!(matches!(
            parse_acct_report(r#"{"nodes": []}"#),
            Err(AcctError::MissingJobs)
        ));
    }

    #[test]
    fn test_expand_requires_object() {
        let text = report(json!([{"job_id": 1, "state": "RUNNING"}]));
        assert!(matches!(
            parse_acct_report(&text),
            Err(AcctError::BadFieldShape { expected: "object", .. })
        ));
    }

    #[test]
    fn test_parse_twice_is_identical() {
        let text = report(json!([{"job_id": 7, "user": "jdoe"}]));
        let first = parse_acct_report(&text).unwrap();
        let second = parse_acct_report(&text).unwrap();
        assert_eq!(first, second);
    }
}
