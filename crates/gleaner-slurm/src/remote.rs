//! Remote report collection.
//!
//! Builds the two collection commands per their contracts and runs
//! them under the cluster's timeout, over ssh for remote clusters.
//! Nothing stays open between runs: each collection is one short ssh
//! session, so scheduled scrapes cannot exhaust login-node session
//! limits.

use crate::status::{NODE_FIELDS, STATUS_DELIMITER};
use chrono::TimeZone;
use gleaner_core::ClusterContext;
use gleaner_parsers::{run_command, CommandError};
use tokio::process::Command;

/// Epoch-second window for the accounting command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

/// Format an epoch second as the cluster-local naive timestamp the
/// accounting command expects.
fn format_local(ts: i64, ctx: &ClusterContext) -> String {
    ctx.offset
        .timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Arguments for the structured accounting command: account filter,
/// time window, json output.
pub fn acct_args(ctx: &ClusterContext, window: &TimeWindow) -> Vec<String> {
    let mut args = vec![
        "--allusers".to_string(),
        "--allocations".to_string(),
        "--json".to_string(),
        "--starttime".to_string(),
        format_local(window.start, ctx),
        "--endtime".to_string(),
        format_local(window.end, ctx),
    ];
    if !ctx.config.accounts.is_empty() {
        args.push("--accounts".to_string());
        args.push(ctx.config.accounts.join(","));
    }
    args
}

/// Arguments for the flat status command: explicit field list and
/// explicit multi-character delimiter.
pub fn status_args() -> Vec<String> {
    vec![
        "--fields".to_string(),
        NODE_FIELDS.join(","),
        "--delimiter".to_string(),
        STATUS_DELIMITER.to_string(),
    ]
}

/// Build the command, wrapping in ssh when the cluster is remote.
fn build_command(ctx: &ClusterContext, program: &str, args: &[String]) -> Command {
    match &ctx.config.host {
        Some(host) => {
            let mut cmd = Command::new("ssh");
            cmd.arg(host).arg(program).args(args);
            cmd
        }
        None => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            cmd
        }
    }
}

/// Collect one structured accounting report.
pub async fn fetch_acct_report(
    ctx: &ClusterContext,
    window: &TimeWindow,
) -> Result<String, CommandError> {
    let args = acct_args(ctx, window);
    let mut cmd = build_command(ctx, &ctx.config.acct_command, &args);
    run_command(&mut cmd, &ctx.config.acct_command, ctx.config.command_timeout()).await
}

/// Collect one flat node status report.
pub async fn fetch_status_report(ctx: &ClusterContext) -> Result<String, CommandError> {
    let args = status_args();
    let mut cmd = build_command(ctx, &ctx.config.status_command, &args);
    run_command(
        &mut cmd,
        &ctx.config.status_command,
        ctx.config.command_timeout(),
    )
    .await
}
