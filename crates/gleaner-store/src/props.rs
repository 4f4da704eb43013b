//! User props: arbitrary annotations attached to a job, outside the
//! scraped schema.
//!
//! Scoped to one (job id, cluster name) key. Updates are per-key
//! merges, so concurrent edits to different prop names both survive.

use crate::store::Store;
use gleaner_state::JobKey;
use std::collections::BTreeMap;
use thiserror::Error;

/// Ceiling on the serialized size of one job's full props mapping.
pub const MAX_PROPS_BYTES: usize = 2 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum PropsError {
    #[error("No job found for {key}")]
    NotFound { key: JobKey },
    #[error("Props for {key} would serialize to {size} bytes, over the {limit} byte limit")]
    TooLarge {
        key: JobKey,
        size: usize,
        limit: usize,
    },
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Current props mapping for a job.
///
/// An empty mapping is a valid answer; a missing parent job is not.
pub fn get_props(store: &Store, key: &JobKey) -> Result<BTreeMap<String, String>, PropsError> {
    store
        .get_job(key)
        .map(|doc| doc.user_owned.props.clone())
        .ok_or_else(|| PropsError::NotFound { key: key.clone() })
}

/// Merge updates into a job's props and return the resulting mapping.
///
/// New keys are added and existing keys overwritten. If the merged
/// mapping would serialize over the ceiling, the whole update is
/// rejected and the stored mapping is left byte-for-byte unchanged —
/// there is no partial application.
pub fn set_props(
    store: &mut Store,
    key: &JobKey,
    updates: BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, PropsError> {
    let doc = store
        .get_job_mut(key)
        .ok_or_else(|| PropsError::NotFound { key: key.clone() })?;

    let mut merged = doc.user_owned.props.clone();
    merged.extend(updates);

    let size = serde_json::to_vec(&merged)?.len();
    if size > MAX_PROPS_BYTES {
        return Err(PropsError::TooLarge {
            key: key.clone(),
            size,
            limit: MAX_PROPS_BYTES,
        });
    }

    doc.user_owned.props = merged.clone();
    store.save()?;
    Ok(merged)
}

/// Remove the named keys from a job's props.
///
/// Absence of a key is not an error. Deleting every key never deletes
/// the parent job document.
pub fn delete_props(store: &mut Store, key: &JobKey, keys: &[String]) -> Result<(), PropsError> {
    let doc = store
        .get_job_mut(key)
        .ok_or_else(|| PropsError::NotFound { key: key.clone() })?;

    for name in keys {
        doc.user_owned.props.remove(name);
    }
    store.save()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{job_record, temp_store};
    use crate::upsert::upsert_jobs;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn seeded_store() -> (tempfile::TempDir, Store, JobKey) {
        let (dir, mut store) = temp_store();
        let record = job_record("apollo", "42", None);
        let key = record.key();
        upsert_jobs(&mut store, &[record], 1000).unwrap();
        (dir, store, key)
    }

    #[test]
    fn test_get_empty_props() {
        let (_dir, store, key) = seeded_store();
        assert!(get_props(&store, &key).unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_job_is_not_found() {
        let (_dir, store, _) = seeded_store();
        let missing = JobKey::new("apollo", "99999");
        assert!(matches!(
            get_props(&store, &missing),
            Err(PropsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_set_merges_with_new_values_winning() {
        let (_dir, mut store, key) = seeded_store();
        set_props(&mut store, &key, props(&[("a", "1"), ("b", "2")])).unwrap();
        let result = set_props(&mut store, &key, props(&[("b", "20"), ("c", "3")])).unwrap();

        assert_eq!(result, props(&[("a", "1"), ("b", "20"), ("c", "3")]));
        assert_eq!(get_props(&store, &key).unwrap(), result);
    }

    #[test]
    fn test_oversized_set_is_rejected_atomically() {
        let (_dir, mut store, key) = seeded_store();
        set_props(&mut store, &key, props(&[("keep", "me")])).unwrap();
        let before = get_props(&store, &key).unwrap();

        let huge = BTreeMap::from([("blob".to_string(), "x".repeat(MAX_PROPS_BYTES))]);
        let err = set_props(&mut store, &key, huge).unwrap_err();
        assert!(matches!(err, PropsError::TooLarge { .. }));

        // Stored mapping is byte-for-byte unchanged.
        let after = get_props(&store, &key).unwrap();
        assert_eq!(
            serde_json::to_vec(&after).unwrap(),
            serde_json::to_vec(&before).unwrap()
        );
    }

    #[test]
    fn test_delete_absent_key_is_noop_success() {
        let (_dir, mut store, key) = seeded_store();
        set_props(&mut store, &key, props(&[("a", "1")])).unwrap();

        delete_props(&mut store, &key, &["a".to_string(), "ghost".to_string()]).unwrap();
        assert!(get_props(&store, &key).unwrap().is_empty());

        // Parent job survives a full wipe.
        assert!(store.get_job(&key).is_some());
    }
}
