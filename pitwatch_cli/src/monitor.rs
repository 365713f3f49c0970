//! `monitor`, `forecast` and `self-check`: config overrides, source assembly,
//! the run loop and its console output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use eyre::WrapErr;
use pitwatch_config::{Config, SourceMode};
use pitwatch_core::export::{load_csv, write_export};
use pitwatch_core::runner::{RunEvent, RunParams, RunSummary, run};
use pitwatch_core::util::{format_remaining, period};
use pitwatch_core::{
    MonitorError, MonitorSession, Point, Prediction, PredictorCfg, SessionEvent, predict,
};
use pitwatch_traits::SampleSource;

use crate::cli::json_mode;

/// `monitor` flags that override the config file.
#[derive(Debug, Default, Clone)]
pub struct MonitorArgs {
    pub live: bool,
    pub demo: bool,
    pub ip: Option<String>,
    pub samples: Option<u64>,
    pub refresh_ms: Option<u64>,
    /// `Some(None)`: export into the configured `export.dir`.
    pub export: Option<Option<PathBuf>>,
}

/// Re-tag config validation failures so they map to the config exit code.
pub fn invalid_config(err: &eyre::Report) -> eyre::Report {
    let msg = err.to_string();
    let msg = msg
        .strip_prefix("invalid configuration: ")
        .unwrap_or(&msg)
        .to_string();
    MonitorError::InvalidConfiguration(msg).into()
}

fn apply_overrides(cfg: &mut Config, args: &MonitorArgs) {
    if args.live {
        cfg.source.mode = SourceMode::Live;
    } else if args.demo {
        cfg.source.mode = SourceMode::Demo;
    }
    if let Some(ip) = &args.ip {
        cfg.source.device_ip = Some(ip.clone());
    }
}

fn poll_period(cfg: &Config, override_ms: Option<u64>) -> Duration {
    let ms = override_ms.unwrap_or(match cfg.source.mode {
        SourceMode::Demo => cfg.demo.refresh_ms,
        SourceMode::Live => cfg.source.refresh_ms,
    });
    period(ms)
}

pub fn run_monitor(
    mut cfg: Config,
    args: &MonitorArgs,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    apply_overrides(&mut cfg, args);
    cfg.validate().map_err(|e| invalid_config(&e))?;

    let source = pitwatch_device::build_source(&cfg)?;
    let mut session = MonitorSession::builder().with_config(&cfg).build()?;
    let params = RunParams {
        period: poll_period(&cfg, args.refresh_ms),
        timeout: period(cfg.source.timeout_ms),
        max_samples: args.samples,
    };

    let json = json_mode();
    let mut last_failure: Option<MonitorError> = None;
    let summary = run(source, &mut session, params, shutdown, |ev| match ev {
        RunEvent::Derived(e) => print_event(e, json),
        RunEvent::SourceUnreachable(err) => {
            print_banner(err, json);
            last_failure = Some(err.clone());
        }
    })?;

    if let Some(dir) = &args.export {
        let dir = dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&cfg.export.dir));
        let path = export_session(&session, &dir, Utc::now())?;
        if json {
            println!(
                "{}",
                serde_json::json!({ "type": "export", "path": path.display().to_string() })
            );
        } else {
            println!("cook log written to {}", path.display());
        }
    }
    print_summary(&summary, json);

    match last_failure {
        Some(err) if summary.samples == 0 => Err(err.into()),
        _ => Ok(()),
    }
}

/// The file is named after the UTC date, matching the row timestamps.
fn export_session(
    session: &MonitorSession,
    dir: &Path,
    now: DateTime<Utc>,
) -> eyre::Result<PathBuf> {
    let csv = session.export_csv()?;
    let path = write_export(dir, now.date_naive(), &csv)?;
    tracing::info!(path = %path.display(), rows = session.history().len(), "export written");
    Ok(path)
}

fn print_event(e: &SessionEvent, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "type": "sample", "event": e })
        );
        return;
    }
    let s = &e.status;
    let mut line = format!(
        "[{}] pit {:.1}/{:.0} {:?} {:?} fan {}% {:?}",
        e.sample.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        s.pit,
        s.pit_target,
        s.lock,
        s.range,
        s.fan_duty,
        s.fan,
    );
    for p in &e.probes {
        line.push_str(&format!(" | {} {:.1}", p.name, p.temperature));
        if p.target > 0.0 {
            line.push_str(&format!("/{:.0} ETA {}", p.target, p.prediction));
            if let Some(eta) = p.prediction.eta() {
                line.push_str(&format!(" ({})", format_remaining(eta.seconds_remaining)));
            }
        }
    }
    for a in &e.alerts {
        line.push_str(&format!(" ** {a}"));
    }
    println!("{line}");
}

fn print_banner(err: &MonitorError, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "type": "source_unreachable", "message": err.to_string() })
        );
    } else {
        println!("!! {err} (retrying)");
    }
}

fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "type": "summary",
                "samples": summary.samples,
                "failures": summary.failures,
                "interrupted": summary.interrupted,
            })
        );
    } else {
        println!(
            "monitor stopped: {} samples, {} failed polls{}",
            summary.samples,
            summary.failures,
            if summary.interrupted { " (interrupted)" } else { "" }
        );
    }
}

/// Offline forecast over the meat column of an exported cook log.
pub fn run_forecast(cfg: &Config, csv: &Path, target: f64, now: Option<&str>) -> eyre::Result<()> {
    let rows = load_csv(csv)?;
    let series: Vec<Point> = rows
        .iter()
        .filter_map(|r| {
            r.meat.map(|value| Point {
                timestamp: r.timestamp,
                value,
            })
        })
        .collect();

    let now = match now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .wrap_err_with(|| format!("invalid --now {s:?}"))?
            .with_timezone(&Utc),
        None => series.last().map_or_else(Utc::now, |p| p.timestamp),
    };
    let current = series.last().map_or(f64::NAN, |p| p.value);
    let predictor: PredictorCfg = (&cfg.predictor).into();
    let prediction = predict(&series, current, target, &predictor, now);
    tracing::debug!(points = series.len(), %prediction, "offline forecast");

    if json_mode() {
        println!(
            "{}",
            serde_json::json!({
                "type": "forecast",
                "points": series.len(),
                "current": series.last().map(|p| p.value),
                "target": target,
                "prediction": prediction,
            })
        );
        return Ok(());
    }
    match prediction {
        Prediction::EstimatedAt(eta) => println!(
            "ETA {} ({} remaining, {} points)",
            eta.time_of_day(),
            format_remaining(eta.seconds_remaining),
            series.len()
        ),
        Prediction::AlreadyDone => println!("Done: {current:.1} >= {target:.1}"),
        Prediction::Stalled => println!("Stalled: no measurable rise over the last points"),
        Prediction::Unknown => println!(
            "ETA -- (need at least {} points, have {})",
            predictor.min_points,
            series.len()
        ),
    }
    Ok(())
}

/// Validate the config, build the configured source and fetch once.
pub fn run_self_check(cfg: &Config) -> eyre::Result<()> {
    cfg.validate().map_err(|e| invalid_config(&e))?;
    let mut source = pitwatch_device::build_source(cfg)?;
    let sample = source
        .fetch(period(cfg.source.timeout_ms))
        .map_err(|e| pitwatch_core::source_error::map_source_error(e.as_ref()))?;

    let mode = match cfg.source.mode {
        SourceMode::Demo => "demo",
        SourceMode::Live => "live",
    };
    if json_mode() {
        println!(
            "{}",
            serde_json::json!({ "type": "self_check", "ok": true, "mode": mode, "sample": sample })
        );
    } else {
        println!(
            "ok: {mode} source answered (pit {:.1}, {} probes)",
            sample.pit,
            sample.probes.len()
        );
    }
    Ok(())
}
