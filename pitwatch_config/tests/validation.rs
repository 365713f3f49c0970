use pitwatch_config::{SourceMode, load_path, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

const FULL: &str = r#"
[source]
mode = "live"
device_ip = "192.168.1.50"
proxy_url = "http://localhost:3000"
refresh_ms = 3000
timeout_ms = 4000

[history]
capacity = 100

[predictor]
min_points = 8
regression_window = 12
smooth_window = 3
stall_slope = 0.0005
max_horizon_s = 172800

[status]
pit_target = 250.0
lock_band = 5.0
range_band = 10.0

[export]
per_sample_fan = true
dir = "logs"

[device.fields]
pit = "/pit/temp"
fan = "/fan/duty"
probes = [
  { id = 1, name = "Brisket", temp = "/probes/0/t", target = "/probes/0/set" },
]

[logging]
level = "debug"
rotation = "daily"
"#;

#[test]
fn parses_full_live_config() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.source.mode, SourceMode::Live);
    assert_eq!(cfg.source.device_ip.as_deref(), Some("192.168.1.50"));
    assert_eq!(cfg.status.pit_target, 250.0);
    assert!(cfg.export.per_sample_fan);
    assert_eq!(cfg.device.fields.pit, "/pit/temp");
    // pit_set keeps its default when the table omits it
    assert_eq!(cfg.device.fields.pit_set.as_deref(), Some("/pitSet"));
    assert_eq!(cfg.device.fields.probes.len(), 1);
    assert_eq!(cfg.device.fields.probes[0].name, "Brisket");
}

#[test]
fn live_mode_without_device_ip_is_invalid_configuration() {
    let cfg = load_toml("[source]\nmode = \"live\"\n").expect("parse TOML");
    let err = cfg.validate().expect_err("live mode needs an address");
    assert!(format!("{err}").contains("invalid configuration"));
    assert!(format!("{err}").contains("device_ip"));
}

#[test]
fn blank_device_ip_is_rejected() {
    let cfg = load_toml("[source]\nmode = \"live\"\ndevice_ip = \"  \"\n").expect("parse TOML");
    assert!(cfg.validate().is_err());
}

#[rstest]
#[case("[history]\ncapacity = 0\n", "history.capacity must be >= 1")]
#[case("[predictor]\nmin_points = 1\n", "predictor.min_points must be >= 2")]
#[case("[predictor]\nsmooth_window = 0\n", "predictor.smooth_window must be >= 1")]
#[case("[predictor]\nstall_slope = -0.1\n", "predictor.stall_slope must be finite")]
#[case("[predictor]\nmax_horizon_s = 0\n", "predictor.max_horizon_s must be >= 1")]
#[case("[status]\nlock_band = 0.0\n", "status.lock_band must be > 0")]
#[case("[status]\nrange_band = -1.0\n", "status.range_band must be > 0")]
#[case("[source]\nrefresh_ms = 0\n", "source.refresh_ms must be >= 1")]
#[case("[source]\nproxy_url = \"localhost:3000\"\n", "proxy_url must start with")]
#[case("[device.fields]\npit = \"pitTemp\"\n", "is not a JSON pointer")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn unknown_mode_fails_to_parse() {
    assert!(load_toml("[source]\nmode = \"bluetooth\"\n").is_err());
}

#[test]
fn load_path_reads_and_validates() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.toml");
    fs::write(&good, "[status]\npit_target = 275.0\n").unwrap();
    let cfg = load_path(&good).expect("valid file");
    assert_eq!(cfg.status.pit_target, 275.0);

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[history]\ncapacity = 0\n").unwrap();
    assert!(load_path(&bad).is_err());

    let missing = dir.path().join("missing.toml");
    let err = load_path(&missing).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
