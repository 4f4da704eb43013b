//! Cluster configuration loading.

use camino::Utf8Path;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid JSON in config {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Cluster {cluster}: invalid UTC offset {offset:?} (expected e.g. \"-04:00\")")]
    BadOffset { cluster: String, offset: String },
    #[error("Duplicate cluster name in config: {0}")]
    DuplicateCluster(String),
}

/// Username namespace a cluster's locally reported accounts belong to.
///
/// A report only ever tells us the name a user goes by on that cluster;
/// which namespace that name lives in is declared per cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserNamespace {
    /// Cluster-local account name.
    Cluster,
    /// Institutional email-derived username.
    Email,
    /// External-partner account name.
    Partner,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_acct_command() -> String {
    "sacct".to_string()
}

fn default_status_command() -> String {
    "slurm_node_report".to_string()
}

/// One cluster entry from the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Unique cluster name; part of every business key.
    pub name: String,

    /// UTC offset of the cluster's local clock, e.g. "-04:00".
    ///
    /// Timestamps in reports are naive cluster-local strings and must be
    /// converted with this offset, never the host timezone.
    pub utc_offset: String,

    /// Which namespace the usernames in this cluster's reports belong to.
    pub local_users_are: UserNamespace,

    /// ssh host to collect through; None runs commands on this machine.
    #[serde(default)]
    pub host: Option<String>,

    /// Account filter passed to the accounting command (empty = all).
    #[serde(default)]
    pub accounts: Vec<String>,

    /// Structured accounting command (must honor the account-filter,
    /// time-window, and json contract).
    #[serde(default = "default_acct_command")]
    pub acct_command: String,

    /// Flat node status command (must honor the field-list and
    /// multi-character-delimiter contract).
    #[serde(default = "default_status_command")]
    pub status_command: String,

    /// Upper bound on any single remote command, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl ClusterConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset
            .parse()
            .map_err(|_| ConfigError::BadOffset {
                cluster: self.name.clone(),
                offset: self.utc_offset.clone(),
            })
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// A cluster config with its offset parsed up front.
///
/// Built once at startup and passed by reference to every component
/// that needs it.
#[derive(Debug, Clone)]
pub struct ClusterContext {
    pub config: ClusterConfig,
    pub offset: FixedOffset,
}

impl ClusterContext {
    pub fn new(config: ClusterConfig) -> Result<Self, ConfigError> {
        let offset = config.offset()?;
        Ok(Self { config, offset })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// Load the cluster configuration file into a by-name map.
///
/// The file is a JSON array of cluster objects.
pub fn load_clusters(path: &Utf8Path) -> Result<HashMap<String, ClusterContext>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let configs: Vec<ClusterConfig> =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })?;

    let mut clusters = HashMap::new();
    for config in configs {
        let name = config.name.clone();
        let context = ClusterContext::new(config)?;
        if clusters.insert(name.clone(), context).is_some() {
            return Err(ConfigError::DuplicateCluster(name));
        }
    }
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("clusters.json")).unwrap();
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_clusters() {
        let (_dir, path) = write_config(
            r#"[
                {"name": "graham", "utc_offset": "-05:00", "local_users_are": "cluster"},
                {"name": "apollo", "utc_offset": "+01:00", "local_users_are": "email",
                 "host": "login.apollo.example.org", "accounts": ["rrg-lab", "def-lab"]}
            ]"#,
        );

        let clusters = load_clusters(&path).unwrap();
        assert_eq!(clusters.len(), 2);

        let graham = &clusters["graham"];
        assert_eq!(graham.config.local_users_are, UserNamespace::Cluster);
        assert_eq!(graham.offset.local_minus_utc(), -5 * 3600);
        assert_eq!(graham.config.acct_command, "sacct");
        assert!(graham.config.host.is_none());

        let apollo = &clusters["apollo"];
        assert_eq!(apollo.config.host.as_deref(), Some("login.apollo.example.org"));
        assert_eq!(apollo.config.accounts.len(), 2);
    }

    #[test]
    fn test_bad_offset() {
        let (_dir, path) = write_config(
            r#"[{"name": "x", "utc_offset": "eastern", "local_users_are": "cluster"}]"#,
        );
        assert!(matches!(
            load_clusters(&path),
            Err(ConfigError::BadOffset { .. })
        ));
    }

    #[test]
    fn test_duplicate_cluster() {
        let (_dir, path) = write_config(
            r#"[
                {"name": "x", "utc_offset": "+00:00", "local_users_are": "cluster"},
                {"name": "x", "utc_offset": "+00:00", "local_users_are": "email"}
            ]"#,
        );
        assert!(matches!(
            load_clusters(&path),
            Err(ConfigError::DuplicateCluster(name)) if name == "x"
        ));
    }
}
