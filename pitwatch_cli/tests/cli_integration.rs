use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

// Seeded demo source, fast enough for tests
fn write_demo_config(dir: &Path) -> PathBuf {
    let toml = r#"
[source]
mode = "demo"

[demo]
seed = 42
refresh_ms = 5
"#;
    let path = dir.join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// 12 rows, 5 s apart, meat rising 0.5 per row from 150.
fn write_cook_log(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("cook_log_2024-05-04.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "Timestamp,Pit Temp,Meat 1 Temp,Fan Speed").unwrap();
    for i in 0..rows {
        let secs = i * 5;
        writeln!(
            f,
            "2024-05-04T12:{:02}:{:02}.000Z,225.0,{:.1},30",
            secs / 60,
            secs % 60,
            150.0 + 0.5 * i as f64
        )
        .unwrap();
    }
    path
}

fn pitwatch() -> Command {
    Command::cargo_bin("pitwatch").unwrap()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["health"], 0, "ok", "stdout")]
#[case(&[], 2, "Usage:", "stderr")]
#[case(&["monitor", "--live", "--demo"], 2, "cannot be used with", "stderr")]
#[case(&["monitor", "--live"], 3, "device_ip", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let assert = pitwatch().args(args).assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn demo_monitor_prints_status_and_exports() {
    let dir = tempdir().unwrap();
    let cfg = write_demo_config(dir.path());
    let out_dir = dir.path().join("logs");
    fs::create_dir(&out_dir).unwrap();

    pitwatch()
        .arg("--config")
        .arg(&cfg)
        .args(["monitor", "--samples", "10", "--export"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pork Shoulder"))
        .stdout(predicate::str::contains("monitor stopped: 10 samples"))
        .stdout(predicate::str::contains("cook log written to"));

    let logs: Vec<_> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(logs.len(), 1);
    let name = logs[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("cook_log_") && name.ends_with(".csv"), "{name}");
    let text = fs::read_to_string(&logs[0]).unwrap();
    assert_eq!(text.lines().count(), 11);
    assert!(text.starts_with("Timestamp,Pit Temp,Meat 1 Temp,Fan Speed\n"));
}

#[test]
fn json_monitor_emits_one_object_per_line() {
    let dir = tempdir().unwrap();
    let cfg = write_demo_config(dir.path());

    let out = pitwatch()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args(["monitor", "--samples", "3"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(out.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect();
    assert_eq!(lines.len(), 4);
    for (i, v) in lines[..3].iter().enumerate() {
        assert_eq!(v["type"], "sample");
        assert_eq!(v["event"]["seq"], i as u64 + 1);
        assert_eq!(v["event"]["prediction"]["state"], "unknown");
    }
    assert_eq!(lines[3]["type"], "summary");
    assert_eq!(lines[3]["samples"], 3);
}

#[rstest]
#[case(12, "195", "ETA ")]
#[case(12, "100", "Done")]
#[case(3, "195", "ETA --")]
fn forecast_over_cook_log(#[case] rows: usize, #[case] target: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let csv = write_cook_log(dir.path(), rows);
    pitwatch()
        .arg("forecast")
        .arg("--csv")
        .arg(&csv)
        .args(["--target", target])
        .assert()
        .success()
        .stdout(predicate::str::contains(needle));
}

#[test]
fn forecast_json_reports_estimate() {
    let dir = tempdir().unwrap();
    let csv = write_cook_log(dir.path(), 12);
    let out = pitwatch()
        .arg("--json")
        .arg("forecast")
        .arg("--csv")
        .arg(&csv)
        .args(["--target", "195", "--now", "2024-05-04T12:00:55Z"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["points"], 12);
    assert_eq!(v["prediction"]["state"], "estimated_at");
    assert!(v["prediction"]["seconds_remaining"].as_f64().unwrap() > 0.0);
}

#[test]
fn forecast_rejects_foreign_csv() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.csv");
    fs::write(&bad, "time,temp\n1,2\n").unwrap();
    pitwatch()
        .arg("forecast")
        .arg("--csv")
        .arg(&bad)
        .args(["--target", "195"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Timestamp,Pit Temp,Meat 1 Temp,Fan Speed"));
}

#[test]
fn unreachable_device_fails_self_check() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("live.toml");
    // Nothing listens on the discard port in CI.
    fs::write(
        &cfg,
        "[source]\nmode = \"live\"\ndevice_ip = \"127.0.0.1:9\"\ntimeout_ms = 300\n",
    )
    .unwrap();
    pitwatch()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("could not be reached"));
}

#[test]
fn demo_self_check_passes() {
    let dir = tempdir().unwrap();
    let cfg = write_demo_config(dir.path());
    pitwatch()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: demo source answered"));
}

#[rstest]
#[case("[history]\ncapacity = 0\n", "history.capacity")]
#[case("[source\nmode = 1", "not valid TOML")]
fn bad_config_exits_3(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, toml).unwrap();
    pitwatch()
        .arg("--config")
        .arg(&cfg)
        .args(["monitor", "--samples", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains(needle));
}
