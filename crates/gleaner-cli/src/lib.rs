//! CLI argument parsing for gleaner.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(about = "Harvest Slurm cluster state into a queryable store")]
pub struct Args {
    /// Cluster configuration file
    #[arg(long, default_value = "clusters.json")]
    pub config: Utf8PathBuf,

    /// Store file
    #[arg(long, default_value = "gleaner-store.json")]
    pub store: Utf8PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape each configured cluster once
    Scrape {
        /// Only scrape this cluster
        #[arg(long)]
        cluster: Option<String>,

        /// Hours of accounting history to request
        #[arg(long, default_value = "24")]
        since_hours: u64,
    },

    /// Scrape on an interval until interrupted
    Watch {
        /// Seconds between scrape rounds
        #[arg(long, default_value = "300")]
        interval: u64,

        /// Hours of accounting history to request per round
        #[arg(long, default_value = "24")]
        since_hours: u64,
    },

    /// Delete jobs that ended more than N days ago
    Prune {
        #[arg(long)]
        days: u32,
    },

    /// Mirror recent jobs into another store instance
    Sync {
        /// Destination store file
        #[arg(long)]
        dest: Utf8PathBuf,

        /// Age threshold in days; when given, old ended jobs are also
        /// deleted from the destination
        #[arg(long)]
        days: Option<u32>,
    },

    /// Read or edit user props on a job
    Props {
        #[command(subcommand)]
        action: PropsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum PropsAction {
    /// Print a job's props as JSON
    Get { cluster: String, job_id: String },

    /// Merge key=value pairs into a job's props
    Set {
        cluster: String,
        job_id: String,
        /// key=value pairs
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// Remove keys from a job's props
    Delete {
        cluster: String,
        job_id: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

/// Split one "key=value" argument.
pub fn parse_key_value(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {pair:?}")),
    }
}
