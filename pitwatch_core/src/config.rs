//! Runtime configuration for the monitoring core.
//!
//! These are the structs the session, predictor and classifier consume.
//! They are separate from the TOML-deserialized config in `pitwatch_config`.

/// History buffer sizing.
#[derive(Debug, Clone, Copy)]
pub struct HistoryCfg {
    /// Maximum number of samples retained (FIFO eviction beyond this).
    pub capacity: usize,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Completion predictor guardrails.
#[derive(Debug, Clone, Copy)]
pub struct PredictorCfg {
    /// Fewer buffered points than this yields `Prediction::Unknown`.
    pub min_points: usize,
    /// Trailing points used for the fit; raised to `min_points` when smaller.
    pub regression_window: usize,
    /// Trailing moving-average window applied before the fit (1 = no smoothing).
    pub smooth_window: usize,
    /// Slopes at or below this many degrees per second are reported as stalled.
    pub stall_slope: f64,
    /// Upper bound on the projected time remaining, in seconds.
    pub max_horizon_s: f64,
}

impl Default for PredictorCfg {
    fn default() -> Self {
        Self {
            min_points: 8,
            regression_window: 12,
            smooth_window: 3,
            stall_slope: 0.0005,
            max_horizon_s: 172_800.0,
        }
    }
}

impl PredictorCfg {
    /// Number of trailing points the fit actually uses.
    #[inline]
    pub fn fit_window(&self) -> usize {
        self.min_points.max(self.regression_window)
    }
}

/// Thresholds for the status classifier.
///
/// `lock_band` and `range_band` drive different indicators and are kept
/// independent on purpose; do not derive one from the other.
#[derive(Debug, Clone, Copy)]
pub struct StatusCfg {
    /// Pit set-point used when a sample carries none.
    pub pit_target: f64,
    /// Locked while `|pit - target| < lock_band` (exclusive).
    pub lock_band: f64,
    /// Hot above `target + range_band`, cold below `target - range_band`.
    pub range_band: f64,
}

impl Default for StatusCfg {
    fn default() -> Self {
        Self {
            pit_target: 225.0,
            lock_band: 5.0,
            range_band: 10.0,
        }
    }
}

/// Which fan value the export writes on each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanColumn {
    /// The supplied current duty on every row.
    Current(u8),
    /// Each sample's own recorded duty.
    PerSample,
}

/// Export behaviour.
#[derive(Debug, Clone, Default)]
pub struct ExportCfg {
    /// When true, rows carry each sample's own fan duty.
    pub per_sample_fan: bool,
}

impl ExportCfg {
    /// Resolve the fan column given the controller's current duty.
    pub fn fan_column(&self, current_fan: u8) -> FanColumn {
        if self.per_sample_fan {
            FanColumn::PerSample
        } else {
            FanColumn::Current(current_fan)
        }
    }
}
