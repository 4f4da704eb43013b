//! Slurm integration for gleaner.
//!
//! Parses the two report formats the collectors emit (structured job
//! accounting, flat node status), translates raw fields into
//! normalized records, and resolves user identities.

pub mod acct;
pub mod handlers;
pub mod identity;
pub mod remote;
pub mod status;
pub mod translate;
pub mod types;

pub use acct::{parse_acct_report, AcctEntry, AcctError};
pub use identity::UserIdentity;
pub use status::{parse_status_report, NODE_FIELDS, STATUS_DELIMITER};
pub use translate::{translate_job, translate_node, TranslateError};
pub use types::{JobState, NormalizedJob, NormalizedNode, RawObject};
