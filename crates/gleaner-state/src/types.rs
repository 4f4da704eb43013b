//! Three-partition record types.
//!
//! Every stored job and node document is split into exactly three
//! partitions:
//!
//! - `raw`: the upstream report entry verbatim, for traceability.
//!   Business logic never branches on it.
//! - `normalized`: the fixed-field canonical form. Replaced in full
//!   on every scrape.
//! - `user_owned`: identities and props. Created once, then mutated
//!   only by explicit user actions, never by a scrape.

use gleaner_slurm::{NormalizedJob, NormalizedNode, RawObject, UserIdentity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// User-owned partition of a job document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobUserOwned {
    #[serde(flatten)]
    pub identity: UserIdentity,
    /// Arbitrary user-set annotations.
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

/// User-owned partition of a node document.
///
/// Currently empty; present so both document kinds share the same
/// three-partition shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUserOwned {}

/// One canonical job observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub raw: RawObject,
    pub normalized: NormalizedJob,
    pub user_owned: JobUserOwned,
}

/// One canonical node observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub raw: RawObject,
    pub normalized: NormalizedNode,
    pub user_owned: NodeUserOwned,
}

/// Business key of a job document.
///
/// Job identifiers are not globally unique; the cluster name is
/// mandatory for disambiguation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    pub cluster_name: String,
    pub job_id: String,
}

impl JobKey {
    pub fn new(cluster_name: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            job_id: job_id.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster_name, self.job_id)
    }
}

impl JobRecord {
    pub fn key(&self) -> JobKey {
        JobKey::new(&self.normalized.cluster_name, &self.normalized.job_id)
    }
}

/// Business key of a node document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub cluster_name: String,
    pub node_name: String,
}

impl NodeKey {
    pub fn new(cluster_name: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            node_name: node_name.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster_name, self.node_name)
    }
}

impl NodeRecord {
    pub fn key(&self) -> NodeKey {
        NodeKey::new(&self.normalized.cluster_name, &self.normalized.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(JobKey::new("apollo", "123_4").to_string(), "apollo/123_4");
        assert_eq!(
            NodeKey::new("apollo", "cn-c017").to_string(),
            "apollo/cn-c017"
        );
    }

    #[test]
    fn test_user_owned_serializes_flat_identity() {
        let owned = JobUserOwned {
            identity: UserIdentity {
                cluster_username: Some("jdoe".to_string()),
                email_username: None,
                partner_username: None,
            },
            props: BTreeMap::from([("note".to_string(), "rerun".to_string())]),
        };
        let value = serde_json::to_value(&owned).unwrap();
        assert_eq!(value["cluster_username"], "jdoe");
        assert_eq!(value["props"]["note"], "rerun");
    }
}
