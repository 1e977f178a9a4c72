#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ARCHIVE: &str = r#"[
  {"date": "2024-01-03", "items": [
    {"name": "Biryani", "totalEarning": 300, "totalPlates": 12},
    {"name": "Dal", "totalEarning": 80, "totalPlates": 8}
  ]},
  {"date": "2024-01-01", "items": [
    {"name": "Biryani", "totalEarning": 250, "totalPlates": 10},
    {"name": "Dal", "totalEarning": 60, "totalPlates": 6}
  ]},
  {"date": "2024-01-02", "items": [
    {"name": "Biryani", "totalEarning": 275, "totalPlates": 11},
    {"name": "Naan", "totalEarning": 40, "totalPlates": 7}
  ]}
]"#;

fn demand(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("demand").unwrap();
    cmd.current_dir(dir.path()).env("DEMAND_ROOT", dir.path());
    cmd
}

fn with_archive(archive: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("dataformodel.json"), archive).unwrap();
    dir
}

fn read_json(dir: &TempDir, key: &str) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.path().join(key)).unwrap();
    serde_json::from_str(&text).unwrap()
}

// ---------------------------------------------------------------------------
// demand train
// ---------------------------------------------------------------------------

#[test]
fn train_writes_model_summary_and_mirror() {
    let dir = with_archive(ARCHIVE);
    demand(&dir)
        .args(["train", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Best action: Biryani"));

    let model = read_json(&dir, "model.json");
    assert_eq!(model["version"], 1);
    assert_eq!(model["dishes"], serde_json::json!(["Biryani", "Dal", "Naan"]));
    assert_eq!(model["epsilon"], 0.2);

    let summary = read_json(&dir, "predicted.json");
    assert_eq!(summary["bestAction"]["dish"], "Biryani");
    assert_eq!(summary["bestAction"]["value"], 275.0);
    assert!(summary["trainedAt"].is_string());
    assert_eq!(read_json(&dir, "frontend/predicted.json"), summary);
}

#[test]
fn train_same_seed_same_counts() {
    let first = with_archive(ARCHIVE);
    let second = with_archive(ARCHIVE);
    for dir in [&first, &second] {
        demand(dir)
            .args(["train", "--seed", "99", "--epsilon", "0.6"])
            .assert()
            .success();
    }
    assert_eq!(
        read_json(&first, "model.json"),
        read_json(&second, "model.json")
    );
}

#[test]
fn train_json_output() {
    let dir = with_archive(ARCHIVE);
    let output = demand(&dir)
        .args(["--json", "train", "--seed", "1", "--episodes", "10"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let visits: u64 = value["counts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_u64().unwrap())
        .sum();
    assert_eq!(visits, 10);
}

#[test]
fn train_missing_archive_fails() {
    let dir = TempDir::new().unwrap();
    demand(&dir)
        .arg("train")
        .assert()
        .failure()
        .stderr(predicate::str::contains("archive not found"));
    assert!(!dir.path().join("model.json").exists());
    assert!(!dir.path().join("predicted.json").exists());
}

#[test]
fn train_empty_archive_is_informational() {
    let dir = with_archive("[]");
    demand(&dir)
        .arg("train")
        .assert()
        .success()
        .stdout(predicate::str::contains("No historical data found."));
    assert!(!dir.path().join("model.json").exists());
}

#[test]
fn train_bad_epsilon_fails() {
    let dir = with_archive(ARCHIVE);
    demand(&dir)
        .args(["train", "--epsilon", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid epsilon"));
}

#[test]
fn train_mirror_failure_still_succeeds() {
    let dir = with_archive(ARCHIVE);
    std::fs::write(dir.path().join("frontend"), "not a directory").unwrap();
    demand(&dir)
        .args(["train", "--seed", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains("failed to mirror summary"));
    assert!(dir.path().join("predicted.json").exists());
}

// ---------------------------------------------------------------------------
// demand model
// ---------------------------------------------------------------------------

#[test]
fn model_shows_last_training() {
    let dir = with_archive(ARCHIVE);
    demand(&dir)
        .args(["train", "--seed", "5"])
        .assert()
        .success();
    demand(&dir)
        .arg("model")
        .assert()
        .success()
        .stdout(predicate::str::contains("Best action: Biryani (275.00)"));

    let output = demand(&dir).args(["--json", "model"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["dishes"], read_json(&dir, "model.json")["dishes"]);
    assert_eq!(value["bestAction"]["dish"], "Biryani");
}

#[test]
fn model_before_training_fails() {
    let dir = with_archive(ARCHIVE);
    demand(&dir)
        .arg("model")
        .assert()
        .failure()
        .stderr(predicate::str::contains("model.json"));
}

#[test]
fn model_rejects_unknown_snapshot_version() {
    let dir = with_archive(ARCHIVE);
    std::fs::write(
        dir.path().join("model.json"),
        r#"{"version": 2, "q_values": [], "counts": [], "dishes": [], "epsilon": 0.2}"#,
    )
    .unwrap();
    demand(&dir)
        .arg("model")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported"));
}

// ---------------------------------------------------------------------------
// demand forecast
// ---------------------------------------------------------------------------

#[test]
fn forecast_writes_four_artifacts() {
    let dir = with_archive(ARCHIVE);
    demand(&dir)
        .arg("forecast")
        .assert()
        .success()
        .stdout(predicate::str::contains("weekly forecast"))
        .stdout(predicate::str::contains("monthly forecast"));

    // plates per day: 16, 18, 20
    let weekly = read_json(&dir, "predicted_weekly.json");
    let weekly = weekly.as_array().unwrap();
    assert_eq!(weekly.len(), 7);
    assert_eq!(weekly[0]["date"], "2024-01-04");
    assert_eq!(weekly[0]["predictedServings"], 22.0);

    let monthly = read_json(&dir, "predicted_monthly.json");
    assert_eq!(monthly.as_array().unwrap().len(), 30);

    for key in ["metrics_weekly.json", "metrics_monthly.json"] {
        let metrics = read_json(&dir, key);
        let metrics = metrics.as_array().unwrap();
        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics[0]["name"], "Accuracy Rate");
        assert_eq!(metrics[3]["name"], "Successful Predictions");
    }
}

#[test]
fn forecast_single_day_is_informational() {
    let dir = with_archive(r#"[{"date": "2024-01-01", "items": []}]"#);
    demand(&dir)
        .arg("forecast")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not enough history to model."));
    assert!(!dir.path().join("predicted_weekly.json").exists());
}

#[test]
fn forecast_missing_archive_fails() {
    let dir = TempDir::new().unwrap();
    demand(&dir).arg("forecast").assert().failure();
}

#[test]
fn forecast_respects_configured_horizons() {
    let dir = with_archive(ARCHIVE);
    std::fs::create_dir_all(dir.path().join(".demand")).unwrap();
    std::fs::write(
        dir.path().join(".demand/config.yaml"),
        "forecast:\n  horizons: [monthly]\n",
    )
    .unwrap();
    demand(&dir).arg("forecast").assert().success();
    assert!(dir.path().join("predicted_monthly.json").exists());
    assert!(!dir.path().join("predicted_weekly.json").exists());
}

#[test]
fn forecast_and_reconcile_follow_configured_prefixes() {
    let dir = with_archive(ARCHIVE);
    std::fs::create_dir_all(dir.path().join(".demand")).unwrap();
    std::fs::write(
        dir.path().join(".demand/config.yaml"),
        "outputs:\n  forecast_prefix: dash/forecast_\n  metrics_prefix: dash/metrics_\n",
    )
    .unwrap();
    demand(&dir)
        .arg("forecast")
        .assert()
        .success()
        .stdout(predicate::str::contains("dash/forecast_weekly.json"));
    assert!(dir.path().join("dash/metrics_monthly.json").exists());
    assert!(!dir.path().join("predicted_weekly.json").exists());

    demand(&dir)
        .args(["reconcile", "--period", "monthly"])
        .assert()
        .success();
}

#[test]
fn forecast_reads_null_fields_as_zero() {
    let dir = with_archive(
        r#"[
          {"date": "2024-01-01", "items": [{"name": "Dal", "totalPlates": 4, "totalEarning": null}]},
          {"date": "2024-01-02", "items": [{"name": "Dal", "totalPlates": null},
                                           {"name": "Naan", "totalPlates": 6}]}
        ]"#,
    );
    demand(&dir).arg("forecast").assert().success();
    // plates per day: 4, 6
    let weekly = read_json(&dir, "predicted_weekly.json");
    assert_eq!(weekly[0]["predictedServings"], 8.0);
}

// ---------------------------------------------------------------------------
// demand reconcile / series
// ---------------------------------------------------------------------------

#[test]
fn reconcile_before_forecast_fails() {
    let dir = with_archive(ARCHIVE);
    demand(&dir)
        .args(["reconcile", "--period", "weekly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("predicted_weekly.json"));
}

#[test]
fn reconcile_after_new_days_arrive() {
    let dir = with_archive(ARCHIVE);
    demand(&dir).arg("forecast").assert().success();

    let mut days: Vec<serde_json::Value> = serde_json::from_str(ARCHIVE).unwrap();
    days.push(serde_json::json!({
        "date": "2024-01-04",
        "items": [{"name": "Biryani", "totalPlates": 22}]
    }));
    std::fs::write(
        dir.path().join("dataformodel.json"),
        serde_json::to_string(&days).unwrap(),
    )
    .unwrap();

    let output = demand(&dir)
        .args(["--json", "reconcile", "--period", "weekly"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["matched_days"], 1);
    assert_eq!(value["metrics"][0]["value"], 100.0);
    assert_eq!(value["metrics"][3]["value"], 1.0);
}

#[test]
fn reconcile_rejects_unknown_period() {
    let dir = with_archive(ARCHIVE);
    demand(&dir)
        .args(["reconcile", "--period", "daily"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown period"));
}

#[test]
fn series_lists_trailing_days() {
    let dir = with_archive(ARCHIVE);
    demand(&dir)
        .args(["series", "--period", "weekly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01"))
        .stdout(predicate::str::contains("310.00"));
}

// ---------------------------------------------------------------------------
// demand config
// ---------------------------------------------------------------------------

#[test]
fn config_init_then_validate() {
    let dir = TempDir::new().unwrap();
    demand(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join(".demand/config.yaml").exists());
    demand(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".demand")).unwrap();
    std::fs::write(
        dir.path().join(".demand/config.yaml"),
        "bandit:\n  epsilon: 3.0\n",
    )
    .unwrap();
    demand(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn config_show_json_has_defaults() {
    let dir = TempDir::new().unwrap();
    let output = demand(&dir)
        .args(["--json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["archive"], "dataformodel.json");
    assert_eq!(value["bandit"]["episodes"], 100);
    assert_eq!(value["forecast"]["yield_field"], "totalPlates");
}
