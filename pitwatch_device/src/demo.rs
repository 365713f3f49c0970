//! Synthetic cook used when no controller is configured.
//!
//! Per tick the pit drifts 10% of the way toward its set-point plus uniform
//! noise, the primary probe rises 0.05..0.10 degrees, and the fan ramps by 2%
//! while the pit is below set and backs off otherwise.

use pitwatch_config::DemoCfg;
use pitwatch_traits::{Clock, Probe, Sample, SampleSource, SystemClock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const DRIFT: f64 = 0.1;
const MEAT_BASE_RISE: f64 = 0.05;
const MEAT_JITTER: f64 = 0.05;
const FAN_STEP: u8 = 2;
const FAN_MAX: u8 = 100;
/// The ambient probe reads this far below the pit.
const AMBIENT_OFFSET: f64 = 15.0;

pub struct DemoSource {
    pit: f64,
    pit_set: f64,
    meat: f64,
    meat_target: f64,
    fan: u8,
    noise: f64,
    rng: StdRng,
    clock: Box<dyn Clock + Send + Sync>,
}

impl DemoSource {
    pub fn new(cfg: &DemoCfg) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            pit: cfg.pit_start,
            pit_set: cfg.pit_set,
            meat: cfg.meat_start,
            meat_target: cfg.meat_target,
            fan: cfg.fan_start.min(FAN_MAX),
            noise: cfg.noise,
            rng,
            clock: Box::new(SystemClock::new()),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Advance the simulation one tick and return the new reading.
    pub fn step(&mut self) -> Sample {
        let jitter: f64 = self.rng.r#gen::<f64>() - 0.5;
        self.pit += (self.pit_set - self.pit) * DRIFT + jitter * self.noise;
        self.meat += MEAT_BASE_RISE + self.rng.r#gen::<f64>() * MEAT_JITTER;
        self.fan = if self.pit < self.pit_set {
            self.fan.saturating_add(FAN_STEP).min(FAN_MAX)
        } else {
            self.fan.saturating_sub(FAN_STEP)
        };

        Sample::new(
            self.clock.wall(),
            self.pit,
            vec![
                Probe::new(1, "Pork Shoulder", self.meat, self.meat_target),
                Probe::new(2, "Ambient", self.pit - AMBIENT_OFFSET, 0.0),
            ],
            self.fan,
        )
        .with_pit_set(self.pit_set)
    }
}

impl SampleSource for DemoSource {
    fn fetch(
        &mut self,
        _timeout: Duration,
    ) -> Result<Sample, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.step())
    }
}
