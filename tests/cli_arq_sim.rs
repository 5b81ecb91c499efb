use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "arq-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn summary_field(stdout: &str, key: &str) -> Option<String> {
    let line = stdout.lines().find(|l| l.starts_with("done @ "))?;
    line.split(", ")
        .find_map(|part| part.strip_prefix(&format!("{key}=")).map(str::to_owned))
}

#[test]
fn arq_sim_writes_events_json_for_a_scenario() {
    let dir = unique_temp_dir("scenario-events");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "protocol": "go_back_n",
    "window_size": 4,
    "timeout_ms": 1000,
    "channel": { "delay_ms": 50, "seed": 1 },
    "send_interval_ms": 100,
    "max_packets": 5,
    "until_ms": 3000
}
        "#,
    );
    let out_json = dir.join("events.json");

    let output = Command::new(env!("CARGO_BIN_EXE_arq_sim"))
        .args([
            "--scenario",
            scenario.to_str().unwrap(),
            "--events-json",
            out_json.to_str().unwrap(),
        ])
        .output()
        .expect("run arq_sim");
    assert!(
        output.status.success(),
        "arq_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(summary_field(&stdout, "confirmed").as_deref(), Some("5"));
    assert_eq!(summary_field(&stdout, "retransmissions").as_deref(), Some("0"));

    let raw = fs::read_to_string(&out_json).expect("read events.json");
    let v: Value = serde_json::from_str(&raw).expect("parse events.json");
    let arr = v.as_array().expect("events.json must be a JSON array");
    assert_eq!(
        arr[0].get("kind").and_then(|k| k.as_str()),
        Some("send"),
        "first event should be the first data send"
    );
    let confirmed = arr
        .iter()
        .filter(|e| e.get("kind").and_then(|k| k.as_str()) == Some("pkt_confirmed"))
        .count();
    assert_eq!(confirmed, 5);
    let mut last = 0;
    for e in arr {
        let t = e.get("t_ns").and_then(|t| t.as_u64()).expect("t_ns");
        assert!(t >= last, "events must be in time order");
        last = t;
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn arq_sim_runs_from_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_arq_sim"))
        .args([
            "--protocol",
            "selective-repeat",
            "--window-size",
            "3",
            "--use-cack",
            "--delay-ms",
            "20",
            "--timeout-ms",
            "200",
            "--send-interval-ms",
            "50",
            "--max-packets",
            "6",
            "--until-ms",
            "2000",
            "--seed",
            "4",
        ])
        .output()
        .expect("run arq_sim");
    assert!(
        output.status.success(),
        "arq_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(summary_field(&stdout, "data_sent").as_deref(), Some("6"));
    assert_eq!(summary_field(&stdout, "confirmed").as_deref(), Some("6"));
}

#[test]
fn arq_sim_rejects_invalid_probability() {
    let output = Command::new(env!("CARGO_BIN_EXE_arq_sim"))
        .args(["--loss-prob", "1.5", "--until-ms", "10"])
        .output()
        .expect("run arq_sim");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("loss_prob"), "stderr={stderr}");
}

#[test]
fn arq_sim_reports_missing_scenario_file() {
    let dir = unique_temp_dir("missing-scenario");
    let output = Command::new(env!("CARGO_BIN_EXE_arq_sim"))
        .args(["--scenario", dir.join("nope.json").to_str().unwrap()])
        .output()
        .expect("run arq_sim");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read scenario"));
    let _ = fs::remove_dir_all(&dir);
}
