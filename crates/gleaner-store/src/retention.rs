//! Retention and cross-instance sync.
//!
//! Both operations are filters over end times. A zero or absent end
//! time means "still running or never ended" and is never an
//! expiration candidate.

use crate::store::{Store, StoredJob};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetentionError {
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

const SECONDS_PER_DAY: i64 = 86_400;

fn cutoff(older_than_days: u32, now: i64) -> i64 {
    now - i64::from(older_than_days) * SECONDS_PER_DAY
}

/// Whether a job is recent or still active relative to an optional
/// cutoff. With no cutoff, every job qualifies.
fn recent_or_active(doc: &StoredJob, cutoff: Option<i64>) -> bool {
    match doc.normalized.end_time {
        None | Some(0) => true,
        Some(end) => cutoff.is_none_or(|c| end >= c),
    }
}

/// Delete job documents that ended more than `older_than_days` ago.
///
/// Returns the number of deleted documents. Jobs with no end time are
/// never pruned by this rule, however old their submission is.
pub fn prune_jobs(
    store: &mut Store,
    older_than_days: u32,
    now: i64,
) -> Result<usize, RetentionError> {
    let cutoff = cutoff(older_than_days, now);
    let before = store.data.jobs.len();
    store
        .data
        .jobs
        .retain(|_, doc| recent_or_active(doc, Some(cutoff)));
    let deleted = before - store.data.jobs.len();
    if deleted > 0 {
        store.save()?;
    }
    Ok(deleted)
}

/// Result of one cross-instance sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub copied: usize,
    pub deleted: usize,
}

/// Mirror recent-or-active jobs from `source` into `destination`.
///
/// Documents are matched by their opaque internal id, not the
/// business key, so a re-keyed document on the destination is still
/// the same document. Destructive on the destination only: the
/// old-and-ended complement is deleted there — and only when an
/// explicit age threshold was supplied. Omitting the threshold
/// disables deletion entirely rather than defaulting it to zero.
pub fn sync_jobs(
    source: &Store,
    destination: &mut Store,
    older_than_days: Option<u32>,
    now: i64,
) -> Result<SyncOutcome, RetentionError> {
    let cutoff = older_than_days.map(|days| cutoff(days, now));
    let mut outcome = SyncOutcome::default();

    for (key, doc) in &source.data.jobs {
        if !recent_or_active(doc, cutoff) {
            continue;
        }
        let existing = destination
            .data
            .jobs
            .values_mut()
            .find(|candidate| candidate.meta.id == doc.meta.id);
        match existing {
            Some(candidate) => *candidate = doc.clone(),
            None => {
                destination.data.jobs.insert(key.clone(), doc.clone());
            }
        }
        outcome.copied += 1;
    }

    if let Some(cutoff) = cutoff {
        let before = destination.data.jobs.len();
        destination
            .data
            .jobs
            .retain(|_, doc| recent_or_active(doc, Some(cutoff)));
        outcome.deleted = before - destination.data.jobs.len();
    }

    destination.save()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{job_record, temp_store};
    use crate::upsert::upsert_jobs;

    const NOW: i64 = 1_700_000_000;
    const TEN_DAYS_AGO: i64 = NOW - 10 * SECONDS_PER_DAY;
    const ONE_DAY_AGO: i64 = NOW - SECONDS_PER_DAY;

    fn seeded_store() -> (tempfile::TempDir, Store) {
        let (dir, mut store) = temp_store();
        let records = vec![
            job_record("apollo", "old", Some(TEN_DAYS_AGO)),
            job_record("apollo", "fresh", Some(ONE_DAY_AGO)),
            job_record("apollo", "running", None),
        ];
        upsert_jobs(&mut store, &records, NOW).unwrap();
        (dir, store)
    }

    #[test]
    fn test_prune_deletes_only_old_ended_jobs() {
        let (_dir, mut store) = seeded_store();
        let deleted = prune_jobs(&mut store, 7, NOW).unwrap();
        assert_eq!(deleted, 1);
        assert!(store.data.jobs.contains_key("apollo/fresh"));
        assert!(store.data.jobs.contains_key("apollo/running"));
        assert!(!store.data.jobs.contains_key("apollo/old"));
    }

    #[test]
    fn test_prune_never_touches_zero_end_time() {
        let (_dir, mut store) = temp_store();
        let mut ancient = job_record("apollo", "immortal", None);
        ancient.normalized.submit_time = Some(0);
        upsert_jobs(&mut store, &[ancient], NOW).unwrap();

        let deleted = prune_jobs(&mut store, 1, NOW).unwrap();
        assert_eq!(deleted, 0);
        assert!(store.data.jobs.contains_key("apollo/immortal"));
    }

    #[test]
    fn test_sync_copies_recent_and_deletes_complement() {
        let (_dir, source) = seeded_store();
        let (_dest_dir, mut destination) = temp_store();
        // The destination holds a stale old job that should go away.
        upsert_jobs(
            &mut destination,
            &[job_record("apollo", "stale", Some(TEN_DAYS_AGO))],
            NOW,
        )
        .unwrap();

        let outcome = sync_jobs(&source, &mut destination, Some(7), NOW).unwrap();
        assert_eq!(outcome.copied, 2);
        assert_eq!(outcome.deleted, 1);
        assert!(destination.data.jobs.contains_key("apollo/fresh"));
        assert!(destination.data.jobs.contains_key("apollo/running"));
        assert!(!destination.data.jobs.contains_key("apollo/stale"));
        // Source untouched.
        assert_eq!(source.data.jobs.len(), 3);
    }

    #[test]
    fn test_sync_without_threshold_never_deletes() {
        let (_dir, source) = seeded_store();
        let (_dest_dir, mut destination) = temp_store();
        upsert_jobs(
            &mut destination,
            &[job_record("apollo", "stale", Some(TEN_DAYS_AGO))],
            NOW,
        )
        .unwrap();

        let outcome = sync_jobs(&source, &mut destination, None, NOW).unwrap();
        // Everything copies, nothing is deleted.
        assert_eq!(outcome.copied, 3);
        assert_eq!(outcome.deleted, 0);
        assert!(destination.data.jobs.contains_key("apollo/stale"));
        assert!(destination.data.jobs.contains_key("apollo/old"));
    }

    #[test]
    fn test_sync_matches_by_internal_id() {
        let (_dir, source) = seeded_store();
        let (_dest_dir, mut destination) = temp_store();
        sync_jobs(&source, &mut destination, None, NOW).unwrap();

        // Re-sync after the source job changed: the destination
        // document updates in place, no duplicate appears.
        let (_dir2, mut source2) = temp_store();
        source2.data.jobs = source.data.jobs.clone();
        source2
            .data
            .jobs
            .get_mut("apollo/running")
            .unwrap()
            .normalized
            .end_time = Some(NOW);
        let before = destination.data.jobs.len();
        sync_jobs(&source2, &mut destination, None, NOW).unwrap();
        assert_eq!(destination.data.jobs.len(), before);
        assert_eq!(
            destination.data.jobs["apollo/running"].normalized.end_time,
            Some(NOW)
        );
    }
}
