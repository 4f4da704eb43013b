//! Canonical record assembly.
//!
//! Composes parse -> translate -> identity for a whole report.
//! Deterministic given its inputs; no I/O.

use crate::types::{JobRecord, JobUserOwned, NodeRecord, NodeUserOwned};
use gleaner_core::ClusterContext;
use gleaner_parsers::ReportError;
use gleaner_slurm::acct::AcctEntry;
use gleaner_slurm::{
    parse_acct_report, parse_status_report, translate_job, translate_node, AcctError, RawObject,
    TranslateError, UserIdentity,
};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Schema drift or a translation failure aborts the whole report:
/// plausible-looking but wrong data is worse than a skipped batch.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Acct(#[from] AcctError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Entry {index}: {source}")]
    Translate {
        index: usize,
        source: TranslateError,
    },
}

/// Build one job record from a parsed accounting entry.
pub fn build_job_record(
    entry: &AcctEntry,
    ctx: &ClusterContext,
) -> Result<JobRecord, TranslateError> {
    let normalized = translate_job(entry, ctx)?;
    let identity = UserIdentity::resolve(
        normalized.username.as_deref(),
        ctx.config.local_users_are,
    );
    Ok(JobRecord {
        raw: entry.raw.clone(),
        normalized,
        user_owned: JobUserOwned {
            identity,
            props: BTreeMap::new(),
        },
    })
}

/// Build one node record from a flat status entry.
pub fn build_node_record(
    record: &BTreeMap<String, String>,
    ctx: &ClusterContext,
) -> Result<NodeRecord, TranslateError> {
    let normalized = translate_node(record, ctx)?;
    let raw: RawObject = record
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect();
    Ok(NodeRecord {
        raw,
        normalized,
        user_owned: NodeUserOwned::default(),
    })
}

/// Parse one structured accounting report into canonical job records.
pub fn jobs_from_report(text: &str, ctx: &ClusterContext) -> Result<Vec<JobRecord>, BuildError> {
    let entries = parse_acct_report(text)?;
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            build_job_record(entry, ctx).map_err(|source| BuildError::Translate { index, source })
        })
        .collect()
}

/// Parse one flat status report into canonical node records.
pub fn nodes_from_report(text: &str, ctx: &ClusterContext) -> Result<Vec<NodeRecord>, BuildError> {
    let records = parse_status_report(text)?;
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            build_node_record(record, ctx).map_err(|source| BuildError::Translate { index, source })
        })
        .collect()
}
