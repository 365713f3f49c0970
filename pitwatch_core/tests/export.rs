use chrono::{NaiveDate, TimeZone, Utc};
use pitwatch_core::export::{export_file_name, load_csv, write_export};
use pitwatch_core::mocks::linear_cook;
use pitwatch_core::{FanColumn, MonitorError, export_csv, export_csv_with, parse_csv};
use pitwatch_traits::{Probe, Sample};
use rstest::rstest;
use tempfile::tempdir;

fn three_samples() -> Vec<Sample> {
    let t0 = Utc.timestamp_opt(1_714_824_000, 250_000_000).unwrap();
    vec![
        Sample::new(t0, 224.64, vec![Probe::new(1, "Brisket", 160.04, 203.0)], 10),
        Sample::new(
            t0 + chrono::Duration::seconds(3),
            225.25,
            vec![Probe::new(1, "Brisket", 160.11, 203.0)],
            20,
        ),
        Sample::new(
            t0 + chrono::Duration::seconds(6),
            226.0,
            vec![Probe::new(1, "Brisket", 160.2, 203.0)],
            0,
        ),
    ]
}

#[test]
fn three_samples_make_four_lines_with_current_fan() {
    let csv = export_csv(&three_samples(), 42).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Timestamp,Pit Temp,Meat 1 Temp,Fan Speed");
    assert_eq!(lines[1], "2024-05-04T12:00:00.250Z,224.6,160.0,42");
    for row in &lines[1..] {
        assert!(row.ends_with(",42"), "row {row} should carry the current fan");
    }
}

#[test]
fn per_sample_fan_column_uses_each_row() {
    let csv = export_csv_with(&three_samples(), FanColumn::PerSample).unwrap();
    let fans: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|l| l.rsplit(',').next().unwrap())
        .collect();
    assert_eq!(fans, vec!["10", "20", "0"]);
}

#[test]
fn empty_history_is_header_only() {
    let csv = export_csv(&Vec::<Sample>::new(), 0).unwrap();
    assert_eq!(csv, "Timestamp,Pit Temp,Meat 1 Temp,Fan Speed\n");
}

#[test]
fn round_trip_to_one_decimal() {
    let t0 = Utc.timestamp_opt(1_714_824_000, 0).unwrap();
    let samples = linear_cook(t0, 25, 2, 150.0, 0.037, 195.0);
    let csv = export_csv(&samples, 30).unwrap();
    let rows = parse_csv(csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), samples.len());
    for (s, r) in samples.iter().zip(&rows) {
        assert_eq!(r.timestamp, s.timestamp);
        assert!((r.pit - s.pit).abs() <= 0.05 + 1e-9);
        let meat = r.meat.expect("primary probe present");
        assert!((meat - s.probes[0].temperature).abs() <= 0.05 + 1e-9);
        assert_eq!(r.fan, 30);
    }
}

#[test]
fn sample_without_probes_leaves_meat_empty() {
    let s = Sample::new(Utc.timestamp_opt(1_714_824_000, 0).unwrap(), 200.0, vec![], 5);
    let csv = export_csv(&[s], 5).unwrap();
    assert!(csv.lines().nth(1).unwrap().contains(",200.0,,5"));
    let rows = parse_csv(csv.as_bytes()).unwrap();
    assert_eq!(rows[0].meat, None);
}

#[rstest]
#[case("when,pit,meat,fan\n")]
#[case("Timestamp,Pit Temp,Fan Speed\n")]
fn parse_rejects_wrong_headers(#[case] data: &str) {
    let err = parse_csv(data.as_bytes()).expect_err("bad headers");
    assert!(matches!(err, MonitorError::Export(ref m) if m.contains("must have headers")));
}

#[test]
fn parse_reports_bad_row_number() {
    let data = "Timestamp,Pit Temp,Meat 1 Temp,Fan Speed\n\
                2024-05-04T12:00:00.000Z,225.0,160.0,10\n\
                not-a-time,225.0,160.0,10\n";
    let err = parse_csv(data.as_bytes()).expect_err("bad timestamp");
    assert!(err.to_string().contains("invalid CSV row 3"));
}

#[test]
fn file_name_uses_iso_date() {
    let d = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
    assert_eq!(export_file_name(d), "cook_log_2024-05-04.csv");
}

#[test]
fn write_then_load_from_disk() {
    let dir = tempdir().unwrap();
    let d = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
    let csv = export_csv(&three_samples(), 7).unwrap();
    let path = write_export(dir.path(), d, &csv).unwrap();
    assert!(path.ends_with("cook_log_2024-05-04.csv"));
    assert!(!dir.path().join("cook_log_2024-05-04.csv.new").exists());
    let rows = load_csv(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.fan == 7));
}
