//! Gleaner - Slurm cluster state harvester.

mod polling;

use clap::Parser;
use gleaner_cli::{parse_key_value, Args, Command, PropsAction};
use gleaner_core::load_clusters;
use gleaner_state::JobKey;
use gleaner_store::{delete_props, get_props, prune_jobs, set_props, sync_jobs, Store};
use miette::{miette, IntoDiagnostic, Result};
use polling::{PollingConfig, PollingService};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Command::Scrape {
            cluster,
            since_hours,
        } => {
            let clusters = load_clusters(&args.config).into_diagnostic()?;
            if let Some(name) = &cluster {
                if !clusters.contains_key(name) {
                    return Err(miette!("cluster {name:?} is not in {}", args.config));
                }
            }
            let mut store = Store::open(&args.store).into_diagnostic()?;
            let applied =
                polling::scrape_round(&clusters, &mut store, cluster.as_deref(), since_hours)
                    .await;
            if applied == 0 && !clusters.is_empty() {
                return Err(miette!("no cluster applied any data; see logs"));
            }
        }

        Command::Watch {
            interval,
            since_hours,
        } => {
            let clusters = load_clusters(&args.config).into_diagnostic()?;
            let service = PollingService::new(
                clusters,
                args.store.clone(),
                PollingConfig {
                    interval: Duration::from_secs(interval),
                    since_hours,
                },
            );
            service.run().await;
        }

        Command::Prune { days } => {
            let mut store = Store::open(&args.store).into_diagnostic()?;
            let now = chrono::Utc::now().timestamp();
            let deleted = prune_jobs(&mut store, days, now).into_diagnostic()?;
            println!("pruned {deleted} jobs older than {days} days");
        }

        Command::Sync { dest, days } => {
            let source = Store::open(&args.store).into_diagnostic()?;
            let mut destination = Store::open(&dest).into_diagnostic()?;
            let now = chrono::Utc::now().timestamp();
            let outcome = sync_jobs(&source, &mut destination, days, now).into_diagnostic()?;
            println!(
                "synced {} jobs to {dest}, deleted {}",
                outcome.copied, outcome.deleted
            );
        }

        Command::Props { action } => {
            let mut store = Store::open(&args.store).into_diagnostic()?;
            match action {
                PropsAction::Get { cluster, job_id } => {
                    let key = JobKey::new(cluster, job_id);
                    let props = get_props(&store, &key).into_diagnostic()?;
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&props).into_diagnostic()?
                    );
                }
                PropsAction::Set {
                    cluster,
                    job_id,
                    pairs,
                } => {
                    let key = JobKey::new(cluster, job_id);
                    let updates = pairs
                        .iter()
                        .map(|pair| parse_key_value(pair).map_err(|e| miette!("{e}")))
                        .collect::<Result<_>>()?;
                    let merged = set_props(&mut store, &key, updates).into_diagnostic()?;
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&merged).into_diagnostic()?
                    );
                }
                PropsAction::Delete {
                    cluster,
                    job_id,
                    keys,
                } => {
                    let key = JobKey::new(cluster, job_id);
                    delete_props(&mut store, &key, &keys).into_diagnostic()?;
                }
            }
        }
    }

    Ok(())
}
