//! Persistent document store for gleaner.
//!
//! Jobs and nodes live as three-partition documents keyed by their
//! business keys. The upsert engine reconciles fresh scrapes into the
//! collections; props and retention operate on the same documents.

pub mod props;
pub mod retention;
pub mod store;
pub mod upsert;

pub use props::{delete_props, get_props, set_props, PropsError, MAX_PROPS_BYTES};
pub use retention::{prune_jobs, sync_jobs, RetentionError, SyncOutcome};
pub use store::{Collections, DocMeta, Store, StoreError, StoredJob, StoredNode};
pub use upsert::{upsert_jobs, upsert_nodes, UpsertError, UpsertOutcome};
