//! JSON-document storage.

use camino::{Utf8Path, Utf8PathBuf};
use gleaner_slurm::{NormalizedJob, NormalizedNode, RawObject};
use gleaner_state::{JobKey, JobUserOwned, NodeKey, NodeUserOwned};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Store-internal document metadata, outside the three partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    /// Opaque internal identifier, distinct from the business key.
    pub id: String,
    /// Epoch seconds of the last scrape that touched this document.
    pub last_update: Option<i64>,
}

impl DocMeta {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            last_update: None,
        }
    }
}

impl Default for DocMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// One stored job document: three partitions plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredJob {
    #[serde(rename = "_meta")]
    pub meta: DocMeta,
    pub raw: RawObject,
    pub normalized: NormalizedJob,
    pub user_owned: JobUserOwned,
}

/// One stored node document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    #[serde(rename = "_meta")]
    pub meta: DocMeta,
    pub raw: RawObject,
    pub normalized: NormalizedNode,
    pub user_owned: NodeUserOwned,
}

/// The collections, keyed by stringified business key so a lookup is
/// one map probe.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default)]
    pub jobs: BTreeMap<String, StoredJob>,
    #[serde(default)]
    pub nodes: BTreeMap<String, StoredNode>,
}

/// Persistent store for one instance.
#[derive(Debug)]
pub struct Store {
    path: Utf8PathBuf,
    pub data: Collections,
}

impl Store {
    /// Open a store file, starting empty if it does not exist yet.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        let data = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Collections::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Persist the collections.
    ///
    /// Written to a temp file then renamed, so a crash mid-write
    /// leaves the previous state intact. Creates parent directories
    /// if needed.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        let temp = self.path.with_extension("tmp");
        fs::write(&temp, content)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    pub fn get_job(&self, key: &JobKey) -> Option<&StoredJob> {
        self.data.jobs.get(&key.to_string())
    }

    pub fn get_job_mut(&mut self, key: &JobKey) -> Option<&mut StoredJob> {
        self.data.jobs.get_mut(&key.to_string())
    }

    pub fn get_node(&self, key: &NodeKey) -> Option<&StoredNode> {
        self.data.nodes.get(&key.to_string())
    }
}
