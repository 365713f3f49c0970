//! Test and helper sources for pitwatch_core

use chrono::{DateTime, Duration, Utc};
use pitwatch_traits::{Probe, Sample, SampleSource};
use std::collections::VecDeque;

/// A source that always errors; useful for exercising the failure banner path.
pub struct UnreachableSource;

impl SampleSource for UnreachableSource {
    fn fetch(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<Sample, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("device unreachable")))
    }
}

/// Replays a fixed script of outcomes, then keeps failing.
pub struct ScriptedSource {
    script: VecDeque<Result<Sample, String>>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Result<Sample, String>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl SampleSource for ScriptedSource {
    fn fetch(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<Sample, Box<dyn std::error::Error + Send + Sync>> {
        match self.script.pop_front() {
            Some(Ok(s)) => Ok(s),
            Some(Err(msg)) => Err(Box::new(std::io::Error::other(msg))),
            None => Err(Box::new(std::io::Error::other("script exhausted"))),
        }
    }
}

/// Build a linear cook: `n` samples `step_s` apart, primary probe rising by
/// `per_step` from `start` toward `target`, pit steady at 225 with fan 30.
pub fn linear_cook(
    t0: DateTime<Utc>,
    n: usize,
    step_s: i64,
    start: f64,
    per_step: f64,
    target: f64,
) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let ts = t0 + Duration::seconds(step_s * i as i64);
            let meat = start + per_step * i as f64;
            Sample::new(
                ts,
                225.0,
                vec![
                    Probe::new(1, "Pork Shoulder", meat, target),
                    Probe::new(2, "Ambient", 210.0, 0.0),
                ],
                30,
            )
        })
        .collect()
}
