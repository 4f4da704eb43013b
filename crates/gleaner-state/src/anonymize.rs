//! De-identification of canonical records.
//!
//! Produces records with the same schema shape but stable pseudonyms
//! in place of identifying values, so fixtures built from production
//! scrapes keep validating real shapes without carrying real users.

use crate::types::{JobRecord, JobUserOwned};
use gleaner_slurm::{RawObject, UserIdentity};
use serde_json::Value;
use std::collections::HashMap;

/// Raw-partition fields that carry identifying values.
const RAW_SCRUB_FIELDS: &[&str] = &["user", "group", "working_directory", "name", "account"];

/// Stable pseudonym assignment across one anonymization run.
///
/// The same input value always maps to the same pseudonym, so
/// relationships between records (two jobs from one user) survive.
#[derive(Debug, Default)]
pub struct Anonymizer {
    users: HashMap<String, String>,
    accounts: HashMap<String, String>,
}

impl Anonymizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn pseudonym(map: &mut HashMap<String, String>, prefix: &str, value: &str) -> String {
        if let Some(existing) = map.get(value) {
            return existing.clone();
        }
        let assigned = format!("{prefix}{:03}", map.len() + 1);
        map.insert(value.to_string(), assigned.clone());
        assigned
    }

    fn user(&mut self, value: &str) -> String {
        Self::pseudonym(&mut self.users, "user", value)
    }

    fn account(&mut self, value: &str) -> String {
        Self::pseudonym(&mut self.accounts, "group", value)
    }

    fn scrub_identity(&mut self, identity: &UserIdentity) -> UserIdentity {
        UserIdentity {
            cluster_username: identity.cluster_username.as_deref().map(|u| self.user(u)),
            email_username: identity.email_username.as_deref().map(|u| self.user(u)),
            partner_username: identity.partner_username.as_deref().map(|u| self.user(u)),
        }
    }

    fn scrub_raw(&mut self, raw: &RawObject) -> RawObject {
        let mut scrubbed = raw.clone();
        for field in RAW_SCRUB_FIELDS {
            if let Some(value) = scrubbed.get_mut(*field) {
                let replacement = match *field {
                    "account" => self.account(&value_text(value)),
                    "working_directory" => "/scrubbed".to_string(),
                    "name" => "job.sh".to_string(),
                    _ => self.user(&value_text(value)),
                };
                *value = Value::String(replacement);
            }
        }
        scrubbed
    }

    /// De-identify one job record, preserving the schema shape.
    pub fn job(&mut self, record: &JobRecord) -> JobRecord {
        let mut normalized = record.normalized.clone();
        normalized.username = record.normalized.username.as_deref().map(|u| self.user(u));
        normalized.account = record.normalized.account.as_deref().map(|a| self.account(a));
        normalized.work_dir = record
            .normalized
            .work_dir
            .as_ref()
            .map(|_| "/scrubbed".to_string());
        normalized.command = record
            .normalized
            .command
            .as_ref()
            .map(|_| "job.sh".to_string());

        JobRecord {
            raw: self.scrub_raw(&record.raw),
            normalized,
            user_owned: JobUserOwned {
                identity: self.scrub_identity(&record.user_owned.identity),
                props: record.user_owned.props.clone(),
            },
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
