//! Canonical cluster records for gleaner.
//!
//! Assembles parsed and translated report entries into the
//! three-partition records the store persists.

pub mod anonymize;
pub mod build;
pub mod types;

pub use anonymize::Anonymizer;
pub use build::{build_job_record, build_node_record, jobs_from_report, nodes_from_report, BuildError};
pub use types::{JobKey, JobRecord, JobUserOwned, NodeKey, NodeRecord, NodeUserOwned};
