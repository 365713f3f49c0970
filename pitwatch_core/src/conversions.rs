//! `From` implementations bridging `pitwatch_config` types to `pitwatch_core` types.

use crate::config::{ExportCfg, HistoryCfg, PredictorCfg, StatusCfg};

// ── HistoryCfg ───────────────────────────────────────────────────────────────

impl From<&pitwatch_config::HistoryCfg> for HistoryCfg {
    fn from(c: &pitwatch_config::HistoryCfg) -> Self {
        Self {
            capacity: c.capacity,
        }
    }
}

// ── PredictorCfg ─────────────────────────────────────────────────────────────

impl From<&pitwatch_config::PredictorCfg> for PredictorCfg {
    fn from(c: &pitwatch_config::PredictorCfg) -> Self {
        Self {
            min_points: c.min_points,
            regression_window: c.regression_window,
            smooth_window: c.smooth_window,
            stall_slope: c.stall_slope,
            max_horizon_s: c.max_horizon_s as f64,
        }
    }
}

// ── StatusCfg ────────────────────────────────────────────────────────────────

impl From<&pitwatch_config::StatusCfg> for StatusCfg {
    fn from(c: &pitwatch_config::StatusCfg) -> Self {
        Self {
            pit_target: c.pit_target,
            lock_band: c.lock_band,
            range_band: c.range_band,
        }
    }
}

// ── ExportCfg ────────────────────────────────────────────────────────────────

impl From<&pitwatch_config::ExportCfg> for ExportCfg {
    fn from(c: &pitwatch_config::ExportCfg) -> Self {
        Self {
            per_sample_fan: c.per_sample_fan,
        }
    }
}
