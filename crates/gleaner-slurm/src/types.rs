//! Normalized job and node types.

use gleaner_parsers::GresDescriptor;
use serde::{Deserialize, Serialize};

/// An opaque field mapping as returned by an upstream report.
pub type RawObject = serde_json::Map<String, serde_json::Value>;

/// Normalized Slurm job state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Suspended,
    Completed,
    Failed,
    Cancelled,
    Timeout,
    Preempted,
    OutOfMemory,
    NodeFail,
    Unknown(String),
}

impl JobState {
    /// Parse an upstream state string.
    ///
    /// Upstream states can carry suffixes like "CANCELLED by 12345";
    /// only the base token matters.
    pub fn parse(s: &str) -> Self {
        let base = s.split_whitespace().next().unwrap_or(s);
        match base.to_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "SUSPENDED" => Self::Suspended,
            "COMPLETED" => Self::Completed,
            "FAILED" | "BOOT_FAIL" | "DEADLINE" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            "TIMEOUT" => Self::Timeout,
            "PREEMPTED" => Self::Preempted,
            "OUT_OF_MEMORY" => Self::OutOfMemory,
            "NODE_FAIL" => Self::NodeFail,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the job can still produce new observations.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Running | Self::Suspended)
    }
}

/// Canonical job fields derived from one accounting report entry.
///
/// Every field here has a fixed meaning; anything the report said
/// verbatim lives in the record's raw partition instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJob {
    /// Job identifier as reported. Not always numeric: array jobs
    /// carry suffixes like "123_4". Unique only within a cluster.
    pub job_id: String,
    pub array_job_id: Option<String>,
    pub array_task_id: Option<String>,
    pub cluster_name: String,

    pub state: JobState,
    pub state_reason: Option<String>,
    pub exit_code: Option<i32>,

    /// Raw local username; input to identity resolution, never shown
    /// as an identity by itself.
    pub username: Option<String>,
    pub account: Option<String>,
    pub partition: Option<String>,
    pub nodes: Option<String>,

    /// Epoch seconds; None when the scheduler has not set the value.
    pub submit_time: Option<i64>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub eligible_time: Option<i64>,

    /// Seconds; 0 when the job has no limit set.
    pub time_limit_secs: u64,

    pub req_cpus: u64,
    pub req_mem_mb: u64,
    pub req_gpus: u64,
    pub alloc_cpus: u64,
    pub alloc_mem_mb: u64,
    pub alloc_gpus: u64,
    pub node_count: u64,

    pub work_dir: Option<String>,
    pub command: Option<String>,
    pub flags: Option<String>,
}

/// Canonical node fields derived from one status report entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedNode {
    pub name: String,
    pub cluster_name: String,

    /// Scheduler node state, lowercased (e.g. "idle", "mixed",
    /// "drained").
    pub state: String,
    pub partitions: Vec<String>,

    pub cpus_total: u64,
    pub cpus_alloc: u64,
    pub memory_mb_total: u64,
    pub memory_mb_alloc: u64,
    pub sockets: u64,
    pub cores_per_socket: u64,

    pub gres: Option<GresDescriptor>,
    /// Display GPU name after memory-variant disambiguation; falls
    /// back to the GRES base name.
    pub gpu_display_name: Option<String>,

    pub features: Option<String>,
    pub reservation: Option<String>,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_parse() {
        assert_eq!(JobState::parse("RUNNING"), JobState::Running);
        assert_eq!(JobState::parse("running"), JobState::Running);
        assert_eq!(JobState::parse("CANCELLED by 12345"), JobState::Cancelled);
        assert_eq!(JobState::parse("OUT_OF_MEMORY"), JobState::OutOfMemory);
        assert_eq!(
            JobState::parse("REQUEUED"),
            JobState::Unknown("REQUEUED".to_string())
        );
    }

    #[test]
    fn test_job_state_is_active() {
        assert!(JobState::Pending.is_active());
        assert!(JobState::Running.is_active());
        assert!(!JobState::Completed.is_active());
        assert!(!JobState::Unknown("REQUEUED".to_string()).is_active());
    }
}
