//! E2E tests for the analytics read commands: JSON contracts, ordering,
//! and the `wf report` summary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn wf_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wf"));
    cmd.current_dir(dir);
    cmd.env("WEFT_LOG", "error");
    cmd
}

/// Seed a small three-role graph: two January cases, one overnight
/// event, and a February tail on c2.
fn seed(dir: &Path) {
    let body = "CaseID;timestamp;Resource;Role;NameActivity\n\
                c1;1-7-19 9:00;Alice;Developer;Plan\n\
                c1;1-7-19 11:00;Bob;Tester;Check\n\
                c2;1-9-19 10:00;Carol;Analyst;Review\n\
                c2;1-10-19 10:00;Alice;Developer;Fix\n\
                c2;2-3-19 22:00;Alice;Developer;Hotfix\n";
    std::fs::write(dir.join("log.csv"), body).expect("write fixture");

    wf_cmd(dir).args(["reload", "log.csv"]).assert().success();
}

fn json_output(dir: &Path, args: &[&str]) -> Value {
    let output = wf_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("command should not crash");
    assert!(
        output.status.success(),
        "wf {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON output")
}

// ---------------------------------------------------------------------------
// Rankings and listings
// ---------------------------------------------------------------------------

#[test]
fn interactions_rank_and_respect_top_limit() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());

    let all = json_output(dir.path(), &["interactions"]);
    let all = all.as_array().expect("array");
    assert_eq!(all.len(), 2);
    // Equal weights tie-break on role names ascending.
    assert_eq!(all[0]["role_a"], "Analyst");
    assert_eq!(all[0]["role_b"], "Developer");
    assert_eq!(all[1]["role_a"], "Developer");
    assert_eq!(all[1]["role_b"], "Tester");

    let top = json_output(dir.path(), &["interactions", "--top", "1"]);
    assert_eq!(top.as_array().expect("array").len(), 1);
}

#[test]
fn collab_lists_month_pairs_with_roles() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());

    let rows = json_output(dir.path(), &["collab", "2019-01"]);
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row["month"], "2019-01");
        assert!(row["weight"].is_number());
    }
}

#[test]
fn org_trend_zero_fills_and_snapshot_aggregates() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());

    let trend = json_output(
        dir.path(),
        &["org", "trend", "--from", "2019-01", "--to", "2019-03"],
    );
    let trend = trend.as_array().expect("array");
    assert_eq!(trend.len(), 3);
    assert_eq!(trend[0]["phase"], "2019-01");
    assert_eq!(trend[1]["phase"], "2019-02");
    assert_eq!(trend[1]["total_interactions"], 0);
    assert_eq!(trend[2]["active_users"], 0);

    let snap = json_output(
        dir.path(),
        &["org", "snapshot", "--from", "2019-01", "--to", "2019-12"],
    );
    assert_eq!(snap["active_users"], 3);
    assert_eq!(snap["active_roles"], 3);
    assert_eq!(snap["phase"], "2019-01 to 2019-12");
}

#[test]
fn overtime_and_utilization_surface_off_hours_work() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());

    let risky = json_output(dir.path(), &["overtime"]);
    let risky = risky.as_array().expect("array");
    assert_eq!(risky.len(), 1);
    assert_eq!(risky[0]["name"], "Alice");
    assert_eq!(risky[0]["overtime_count"], 1);

    let slots = json_output(dir.path(), &["utilization"]);
    let slots = slots.as_array().expect("array");
    assert!(!slots.is_empty());
    // Ascending (weekday, hour) ordering.
    let keys: Vec<(i64, i64)> = slots
        .iter()
        .map(|s| {
            (
                s["weekday"].as_i64().expect("weekday"),
                s["hour"].as_i64().expect("hour"),
            )
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
}

#[test]
fn durations_and_handover_have_stable_shapes() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());

    let durations = json_output(dir.path(), &["durations"]);
    let durations = durations.as_array().expect("array");
    assert_eq!(durations[0]["case_id"], "c2");
    assert_eq!(durations[0]["duration_days"], 25);

    let avg = json_output(dir.path(), &["avg-duration"]);
    assert!(avg["avg_duration_days"].is_number());

    let flows = json_output(dir.path(), &["handover"]);
    for flow in flows.as_array().expect("array") {
        assert!(flow["source_role"].is_string());
        assert!(flow["target_role"].is_string());
        assert!(flow["avg_duration_hours"].is_number());
    }
}

#[test]
fn bpmn_export_pairs_nodes_with_weighted_edges() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());

    let graph = json_output(dir.path(), &["bpmn"]);
    assert_eq!(graph["nodes"].as_array().expect("nodes").len(), 3);
    let edges = graph["edges"].as_array().expect("edges");
    assert_eq!(edges.len(), 2);
    for edge in edges {
        assert_eq!(edge["type"], Value::Null);
        assert_eq!(
            edge["label"],
            edge["weight"].as_i64().expect("weight").to_string()
        );
    }
    for node in graph["nodes"].as_array().expect("nodes") {
        assert_eq!(node["type"], "Role");
    }
}

#[test]
fn monthly_accepts_year_filter_and_rejects_junk() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());

    let months = json_output(dir.path(), &["monthly", "--year", "2019"]);
    assert_eq!(months.as_array().expect("array").len(), 1);

    wf_cmd(dir.path())
        .args(["monthly", "--year", "19"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E4001]"));
}

#[test]
fn report_renders_human_sections() {
    let dir = TempDir::new().expect("tempdir");
    seed(dir.path());

    wf_cmd(dir.path())
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Organization (2019-01 to 2019-02)"))
        .stdout(predicate::str::contains("Top role interactions"))
        .stdout(predicate::str::contains("Overtime risk"))
        .stdout(predicate::str::contains("Longest projects"));
}

#[test]
fn report_on_empty_graph_is_graceful() {
    let dir = TempDir::new().expect("tempdir");
    wf_cmd(dir.path())
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Graph is empty"));
}
