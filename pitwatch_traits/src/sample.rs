//! Telemetry data model shared by sources and the monitoring core.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Highest fan duty a controller can report, in percent.
pub const MAX_FAN_DUTY: u8 = 100;

/// One temperature probe reading together with its own target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probe {
    pub id: u32,
    pub name: String,
    pub temperature: f64,
    /// Target temperature; `<= 0` means the probe has no completion target
    /// (e.g. an ambient probe).
    pub target: f64,
}

impl Probe {
    pub fn new(id: u32, name: impl Into<String>, temperature: f64, target: f64) -> Self {
        Self {
            id,
            name: name.into(),
            temperature,
            target,
        }
    }

    #[inline]
    pub fn has_target(&self) -> bool {
        self.target > 0.0
    }
}

/// A timestamped reading of the whole controller. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub pit: f64,
    /// Set-point reported by the device, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit_set: Option<f64>,
    pub probes: Vec<Probe>,
    pub fan_duty: u8,
}

impl Sample {
    /// Build a sample; fan duty is clamped to 0..=100.
    pub fn new(timestamp: DateTime<Utc>, pit: f64, probes: Vec<Probe>, fan_duty: u8) -> Self {
        Self {
            timestamp,
            pit,
            pit_set: None,
            probes,
            fan_duty: fan_duty.min(MAX_FAN_DUTY),
        }
    }

    pub fn with_pit_set(mut self, set: f64) -> Self {
        self.pit_set = Some(set);
        self
    }

    /// The first probe, which drives the headline completion forecast.
    #[inline]
    pub fn primary_probe(&self) -> Option<&Probe> {
        self.probes.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_duty_is_clamped() {
        let s = Sample::new(Utc::now(), 225.0, vec![], 250);
        assert_eq!(s.fan_duty, 100);
        for duty in 0..=u8::MAX {
            let s = Sample::new(Utc::now(), 225.0, vec![], duty).with_pit_set(225.0);
            assert!(s.fan_duty <= MAX_FAN_DUTY);
        }
    }

    #[test]
    fn ambient_probe_has_no_target() {
        assert!(!Probe::new(2, "Ambient", 210.0, 0.0).has_target());
        assert!(Probe::new(1, "Brisket", 150.0, 203.0).has_target());
    }
}
