//! Cluster configuration and static reference data for gleaner.
//!
//! This crate holds everything that is known before a scrape runs:
//! which clusters exist, how to reach them, and the GPU reference
//! tables used to enrich node GRES data.

pub mod cluster;
pub mod gpu;

pub use cluster::{
    load_clusters, ClusterConfig, ClusterContext, ConfigError, UserNamespace,
};
pub use gpu::{gpu_display_name, gpu_spec, GpuSpec};
