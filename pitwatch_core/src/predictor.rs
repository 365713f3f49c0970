//! Completion predictor: projects when a probe reaches its target.
//!
//! Pipeline per call (no incremental state, re-run after every append):
//! 1. guard on point count and "already there"
//! 2. take the trailing `fit_window()` points and smooth them (trailing MA)
//! 3. ordinary least squares of value vs. seconds since the first point
//! 4. reject degenerate fits and stalled trends, clamp the horizon
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::config::PredictorCfg;
use crate::history::Point;
use crate::smoothing::smooth;

/// Projected completion instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Eta {
    /// Absolute completion instant.
    pub at: DateTime<Utc>,
    /// Seconds from `now` to `at`, after clamping to the horizon.
    pub seconds_remaining: f64,
}

impl Eta {
    /// Local wall-clock time of day, `HH:MM`, no date.
    pub fn time_of_day(&self) -> String {
        self.at.with_timezone(&Local).format("%H:%M").to_string()
    }
}

/// Forecast state for one probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Prediction {
    /// Not enough data (warm-up) or a degenerate fit.
    Unknown,
    /// Current value is already at or above the target.
    AlreadyDone,
    /// Trend is flat, falling, or too small to be meaningful.
    Stalled,
    EstimatedAt(Eta),
}

impl Prediction {
    #[inline]
    pub fn eta(&self) -> Option<&Eta> {
        match self {
            Prediction::EstimatedAt(eta) => Some(eta),
            _ => None,
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prediction::Unknown => f.write_str("--"),
            Prediction::AlreadyDone => f.write_str("Done"),
            Prediction::Stalled => f.write_str("Stalled"),
            Prediction::EstimatedAt(eta) => f.write_str(&eta.time_of_day()),
        }
    }
}

/// Least-squares slope of `value` against seconds since `points[0]`.
///
/// Returns `None` when the denominator is zero or not finite (all timestamps
/// equal, or a single point). The slope itself may be non-finite.
pub fn fit_slope(points: &[Point]) -> Option<f64> {
    let first = points.first()?;
    let t0 = first.timestamp;
    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for p in points {
        let x = (p.timestamp - t0).num_milliseconds() as f64 / 1000.0;
        let y = p.value;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((n * sum_xy - sum_x * sum_y) / denom)
}

/// Forecast when `current` reaches `target` given the probe's `series`.
///
/// Never fails: every edge case resolves to a `Prediction` variant.
pub fn predict(
    series: &[Point],
    current: f64,
    target: f64,
    cfg: &PredictorCfg,
    now: DateTime<Utc>,
) -> Prediction {
    if series.len() < cfg.min_points.max(1) {
        return Prediction::Unknown;
    }
    if !(current.is_finite() && target.is_finite()) {
        return Prediction::Unknown;
    }
    if current >= target {
        return Prediction::AlreadyDone;
    }

    let window = cfg.fit_window();
    let recent = &series[series.len().saturating_sub(window)..];
    let smoothed = smooth(recent, cfg.smooth_window);

    let Some(slope) = fit_slope(&smoothed) else {
        return Prediction::Unknown;
    };
    // A non-positive trend never yields an estimate, whatever the threshold.
    if !slope.is_finite() || slope <= cfg.stall_slope.max(0.0) {
        return Prediction::Stalled;
    }

    let seconds = ((target - current) / slope).min(cfg.max_horizon_s);
    // Out of chrono's range only for absurd `now` values.
    let Some(at) =
        now.checked_add_signed(chrono::Duration::milliseconds((seconds * 1000.0).round() as i64))
    else {
        return Prediction::Unknown;
    };
    tracing::trace!(slope, seconds, "completion estimate");
    Prediction::EstimatedAt(Eta {
        at,
        seconds_remaining: seconds,
    })
}
