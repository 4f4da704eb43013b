//! Reconciling upsert of scraped records.
//!
//! Each record is one conditional write against its business key:
//! replace the scraped partitions on match, insert all three on miss.
//! The user-owned partition is structurally out of reach of a scrape,
//! so overlapping batches converge last-writer-wins on the scraped
//! partitions without ever touching user data.

use crate::store::{DocMeta, Store, StoredJob, StoredNode};
use gleaner_state::{JobRecord, NodeRecord};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpsertError {
    /// Nothing applied out of a non-empty batch: a systemic schema or
    /// connectivity failure, not "no updates needed".
    #[error("No records applied from a batch of {attempted}")]
    NothingApplied { attempted: usize },
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

/// Aggregate result of one upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

impl UpsertOutcome {
    pub fn applied(&self) -> usize {
        self.inserted + self.updated
    }
}

fn job_key_valid(record: &JobRecord) -> bool {
    !record.normalized.job_id.is_empty() && !record.normalized.cluster_name.is_empty()
}

fn node_key_valid(record: &NodeRecord) -> bool {
    !record.normalized.name.is_empty() && !record.normalized.cluster_name.is_empty()
}

/// Upsert a batch of job records.
///
/// The batch is a set of independent conditional writes, not a
/// transaction: one bad record is logged and skipped, the rest still
/// apply. The last-update stamp is a second pass, separate from the
/// data replacement; staleness of the stamp alone is tolerable.
pub fn upsert_jobs(
    store: &mut Store,
    records: &[JobRecord],
    now: i64,
) -> Result<UpsertOutcome, UpsertError> {
    let mut outcome = UpsertOutcome::default();
    let mut touched = Vec::with_capacity(records.len());

    for record in records {
        if !job_key_valid(record) {
            tracing::warn!(
                cluster = %record.normalized.cluster_name,
                job_id = %record.normalized.job_id,
                "Skipping job record with incomplete business key"
            );
            outcome.failed += 1;
            continue;
        }
        let key = record.key().to_string();
        match store.data.jobs.get_mut(&key) {
            Some(existing) => {
                // Partition-scoped replace: user_owned is not touched.
                existing.raw = record.raw.clone();
                existing.normalized = record.normalized.clone();
                outcome.updated += 1;
            }
            None => {
                store.data.jobs.insert(
                    key.clone(),
                    StoredJob {
                        meta: DocMeta::new(),
                        raw: record.raw.clone(),
                        normalized: record.normalized.clone(),
                        user_owned: record.user_owned.clone(),
                    },
                );
                outcome.inserted += 1;
            }
        }
        touched.push(key);
    }

    for key in &touched {
        if let Some(doc) = store.data.jobs.get_mut(key) {
            doc.meta.last_update = Some(now);
        }
    }

    if !records.is_empty() && outcome.applied() == 0 {
        return Err(UpsertError::NothingApplied {
            attempted: records.len(),
        });
    }
    store.save()?;
    Ok(outcome)
}

/// Upsert a batch of node records. Same semantics as jobs.
pub fn upsert_nodes(
    store: &mut Store,
    records: &[NodeRecord],
    now: i64,
) -> Result<UpsertOutcome, UpsertError> {
    let mut outcome = UpsertOutcome::default();
    let mut touched = Vec::with_capacity(records.len());

    for record in records {
        if !node_key_valid(record) {
            tracing::warn!(
                cluster = %record.normalized.cluster_name,
                node = %record.normalized.name,
                "Skipping node record with incomplete business key"
            );
            outcome.failed += 1;
            continue;
        }
        let key = record.key().to_string();
        match store.data.nodes.get_mut(&key) {
            Some(existing) => {
                existing.raw = record.raw.clone();
                existing.normalized = record.normalized.clone();
                outcome.updated += 1;
            }
            None => {
                store.data.nodes.insert(
                    key.clone(),
                    StoredNode {
                        meta: DocMeta::new(),
                        raw: record.raw.clone(),
                        normalized: record.normalized.clone(),
                        user_owned: record.user_owned.clone(),
                    },
                );
                outcome.inserted += 1;
            }
        }
        touched.push(key);
    }

    for key in &touched {
        if let Some(doc) = store.data.nodes.get_mut(key) {
            doc.meta.last_update = Some(now);
        }
    }

    if !records.is_empty() && outcome.applied() == 0 {
        return Err(UpsertError::NothingApplied {
            attempted: records.len(),
        });
    }
    store.save()?;
    Ok(outcome)
}
