//! Qualitative controller state derived from the latest sample only.

use pitwatch_traits::Sample;
use serde::Serialize;

use crate::config::StatusCfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// Pit strictly within `lock_band` of its set-point.
    Locked,
    Adjusting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanState {
    Active,
    Idle,
}

/// Coarser "hot/cold" cue using `range_band`; independent of `LockState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeState {
    Cold,
    InRange,
    Hot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Status {
    pub lock: LockState,
    pub fan: FanState,
    pub range: RangeState,
    pub pit: f64,
    /// Set-point the classification was made against.
    pub pit_target: f64,
    pub fan_duty: u8,
}

/// Classify a pit reading against a target. Total over all inputs; NaN
/// readings compare false and land on `Adjusting` / `InRange`.
pub fn classify(pit: f64, pit_target: f64, fan_duty: u8, cfg: &StatusCfg) -> Status {
    let lock = if (pit - pit_target).abs() < cfg.lock_band {
        LockState::Locked
    } else {
        LockState::Adjusting
    };
    let range = if pit > pit_target + cfg.range_band {
        RangeState::Hot
    } else if pit < pit_target - cfg.range_band {
        RangeState::Cold
    } else {
        RangeState::InRange
    };
    let fan = if fan_duty > 0 {
        FanState::Active
    } else {
        FanState::Idle
    };
    Status {
        lock,
        fan,
        range,
        pit,
        pit_target,
        fan_duty,
    }
}

/// Classify a sample, preferring the set-point the device reported.
pub fn classify_sample(sample: &Sample, cfg: &StatusCfg) -> Status {
    let target = sample.pit_set.unwrap_or(cfg.pit_target);
    classify(sample.pit, target, sample.fan_duty, cfg)
}
