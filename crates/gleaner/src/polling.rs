//! Per-cluster scrape rounds and the periodic polling service.

use camino::Utf8PathBuf;
use chrono::Utc;
use gleaner_core::ClusterContext;
use gleaner_slurm::remote::{fetch_acct_report, fetch_status_report, TimeWindow};
use gleaner_state::{jobs_from_report, nodes_from_report};
use gleaner_store::{upsert_jobs, upsert_nodes, Store};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::interval;

/// Scrape one cluster's jobs and nodes into the store.
///
/// Returns whether anything was applied. Remote failures are
/// transient: logged and retried on the next scheduled round. Schema
/// drift is logged loudly and skips the report; wrong-but-plausible
/// data never reaches the store.
pub async fn scrape_cluster(
    ctx: &ClusterContext,
    store: &mut Store,
    since_hours: u64,
    now: i64,
) -> bool {
    let cluster = ctx.name();
    let mut applied_any = false;

    let window = TimeWindow {
        start: now - (since_hours as i64) * 3600,
        end: now,
    };
    match fetch_acct_report(ctx, &window).await {
        Err(error) => {
            tracing::warn!(%cluster, %error, "Accounting collection failed; will retry next round");
        }
        Ok(text) => match jobs_from_report(&text, ctx) {
            Err(error) => {
                tracing::error!(%cluster, %error, "Accounting report rejected");
            }
            Ok(records) => match upsert_jobs(store, &records, now) {
                Ok(outcome) => {
                    applied_any |= outcome.applied() > 0;
                    tracing::info!(
                        %cluster,
                        inserted = outcome.inserted,
                        updated = outcome.updated,
                        failed = outcome.failed,
                        "Job scrape applied"
                    );
                }
                Err(error) => {
                    tracing::error!(%cluster, %error, "Job upsert failed");
                }
            },
        },
    }

    match fetch_status_report(ctx).await {
        Err(error) => {
            tracing::warn!(%cluster, %error, "Status collection failed; will retry next round");
        }
        Ok(text) => match nodes_from_report(&text, ctx) {
            Err(error) => {
                tracing::error!(%cluster, %error, "Status report rejected");
            }
            Ok(records) => match upsert_nodes(store, &records, now) {
                Ok(outcome) => {
                    applied_any |= outcome.applied() > 0;
                    tracing::info!(
                        %cluster,
                        inserted = outcome.inserted,
                        updated = outcome.updated,
                        failed = outcome.failed,
                        "Node scrape applied"
                    );
                }
                Err(error) => {
                    tracing::error!(%cluster, %error, "Node upsert failed");
                }
            },
        },
    }

    applied_any
}

/// Run one scrape round over the selected clusters.
///
/// Clusters are independent key spaces: a failure on one never stops
/// the others. Returns how many clusters applied data.
pub async fn scrape_round(
    clusters: &HashMap<String, ClusterContext>,
    store: &mut Store,
    only: Option<&str>,
    since_hours: u64,
) -> usize {
    let now = Utc::now().timestamp();
    let mut applied = 0;
    for (name, ctx) in clusters {
        if only.is_some_and(|selected| selected != name) {
            continue;
        }
        if scrape_cluster(ctx, store, since_hours, now).await {
            applied += 1;
        }
    }
    applied
}

/// Configuration for the polling service.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub interval: Duration,
    pub since_hours: u64,
}

/// Periodic scraper over all configured clusters.
pub struct PollingService {
    clusters: HashMap<String, ClusterContext>,
    store_path: Utf8PathBuf,
    config: PollingConfig,
}

impl PollingService {
    pub fn new(
        clusters: HashMap<String, ClusterContext>,
        store_path: Utf8PathBuf,
        config: PollingConfig,
    ) -> Self {
        Self {
            clusters,
            store_path,
            config,
        }
    }

    /// Main polling loop. The store is reopened each round so an
    /// external prune or sync between rounds is picked up.
    pub async fn run(self) {
        let mut ticker = interval(self.config.interval);
        loop {
            ticker.tick().await;
            let mut store = match Store::open(&self.store_path) {
                Ok(store) => store,
                Err(error) => {
                    tracing::error!(%error, "Cannot open store; skipping round");
                    continue;
                }
            };
            let applied = scrape_round(
                &self.clusters,
                &mut store,
                None,
                self.config.since_hours,
            )
            .await;
            tracing::info!(
                clusters = self.clusters.len(),
                applied,
                "Scrape round finished"
            );
        }
    }
}
