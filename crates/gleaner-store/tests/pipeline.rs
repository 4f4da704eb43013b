//! End-to-end pipeline: report text -> canonical records -> store.

use camino::Utf8PathBuf;
use gleaner_core::{ClusterConfig, ClusterContext, UserNamespace};
use gleaner_slurm::{JobState, NODE_FIELDS, STATUS_DELIMITER};
use gleaner_state::{jobs_from_report, nodes_from_report, JobKey, NodeKey};
use gleaner_store::{get_props, set_props, upsert_jobs, upsert_nodes, Store};
use serde_json::json;
use std::collections::BTreeMap;

fn context() -> ClusterContext {
    ClusterContext::new(ClusterConfig {
        name: "apollo".to_string(),
        utc_offset: "-04:00".to_string(),
        local_users_are: UserNamespace::Cluster,
        host: None,
        accounts: vec![],
        acct_command: "sacct".to_string(),
        status_command: "slurm_node_report".to_string(),
        command_timeout_secs: 60,
    })
    .unwrap()
}

fn acct_report(state: &str, end: i64) -> String {
    json!({
        "jobs": [{
            "job_id": 314159,
            "name": "simulate.sh",
            "account": "rrg-lab",
            "user": "jdoe",
            "partition": "gpu",
            "nodes": "cn-c017",
            "allocation_nodes": 1,
            "array": {"job_id": 0, "task_id": null},
            "state": {"current": state, "reason": "None"},
            "exit_code": {"return_code": 0},
            "time": {"submission": 1620500000, "start": 1620500100,
                     "end": end, "eligible": 1620500000, "limit": 180},
            "tres": {
                "requested": [
                    {"type": "cpu", "count": 8},
                    {"type": "mem", "count": 65536},
                    {"type": "gres", "name": "gpu", "count": 4}
                ],
                "allocated": [
                    {"type": "cpu", "count": 8},
                    {"type": "mem", "count": 65536},
                    {"type": "gres", "name": "gpu", "count": 4}
                ]
            },
            "working_directory": "/home/jdoe/sim"
        }]
    })
    .to_string()
}

fn status_report() -> String {
    let header = NODE_FIELDS.join(STATUS_DELIMITER);
    let line = [
        "cn-c017",
        "mixed",
        "gpu",
        "64",
        "48",
        "192000",
        "128000",
        "2",
        "16",
        "gpu:v100:4(S:0-1)",
        "gpu:v100:4",
        "skylake,32gb",
        "(null)",
        "None assigned",
    ]
    .join(STATUS_DELIMITER);
    format!("{header}\n{line}\n")
}

fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("store.json")).unwrap();
    let store = Store::open(&path).unwrap();
    (dir, store)
}

#[test]
fn scrape_then_annotate_then_rescrape() {
    let ctx = context();
    let (_dir, mut store) = temp_store();

    // First scrape: the job is running.
    let jobs = jobs_from_report(&acct_report("RUNNING", 0), &ctx).unwrap();
    let nodes = nodes_from_report(&status_report(), &ctx).unwrap();
    upsert_jobs(&mut store, &jobs, 1000).unwrap();
    upsert_nodes(&mut store, &nodes, 1000).unwrap();

    let job_key = JobKey::new("apollo", "314159");
    let node_key = NodeKey::new("apollo", "cn-c017");

    let doc = store.get_job(&job_key).unwrap();
    assert_eq!(doc.normalized.state, JobState::Running);
    assert!(doc.normalized.end_time.is_none());
    assert_eq!(doc.normalized.alloc_gpus, 4);
    assert_eq!(
        doc.user_owned.identity.cluster_username.as_deref(),
        Some("jdoe")
    );

    let node = store.get_node(&node_key).unwrap();
    assert_eq!(node.normalized.gpu_display_name.as_deref(), Some("v100l"));

    // A user attaches props between scrapes.
    let updates =
        BTreeMap::from([("experiment".to_string(), "lr-sweep-3".to_string())]);
    set_props(&mut store, &job_key, updates).unwrap();

    // Second scrape: the job finished. Data partitions replace,
    // props survive.
    let jobs = jobs_from_report(&acct_report("COMPLETED", 1620510900), &ctx).unwrap();
    upsert_jobs(&mut store, &jobs, 2000).unwrap();

    let doc = store.get_job(&job_key).unwrap();
    assert_eq!(doc.normalized.state, JobState::Completed);
    assert_eq!(doc.normalized.end_time, Some(1620510900));
    assert_eq!(doc.meta.last_update, Some(2000));
    assert_eq!(
        get_props(&store, &job_key).unwrap()["experiment"],
        "lr-sweep-3"
    );

    // Reopening from disk sees the same document.
    let reopened = Store::open(store.path()).unwrap();
    let doc = reopened.get_job(&job_key).unwrap();
    assert_eq!(doc.user_owned.props["experiment"], "lr-sweep-3");
    assert_eq!(doc.normalized.state, JobState::Completed);
}
