//! Monitoring session: owns the history buffer and configuration, and turns
//! every append into one synchronous derive step.
//!
//! `append` returns the resulting `SessionEvent` and also broadcasts it to
//! every subscriber. Appending and deriving happen under one `&mut self`
//! borrow, so no reader can observe the buffer mid-eviction.

use crossbeam_channel as xch;
use pitwatch_traits::clock::{Clock, SystemClock};
use pitwatch_traits::Sample;
use serde::Serialize;

use crate::alerts::{Alert, AlertTracker};
use crate::config::{ExportCfg, HistoryCfg, PredictorCfg, StatusCfg};
use crate::error::{BuildError, MonitorError, Result};
use crate::export::export_csv_with;
use crate::history::{Channel, HistoryBuffer};
use crate::predictor::{Prediction, predict};
use crate::status::{Status, classify_sample};

/// Forecast for one probe of the latest sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeForecast {
    pub id: u32,
    pub name: String,
    pub temperature: f64,
    pub target: f64,
    /// `Unknown` for probes without a target.
    pub prediction: Prediction,
}

/// Result of one append + derive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEvent {
    /// 1-based count of appends in this session.
    pub seq: u64,
    pub sample: Sample,
    pub status: Status,
    /// Headline forecast for the primary probe.
    pub prediction: Prediction,
    pub probes: Vec<ProbeForecast>,
    pub alerts: Vec<Alert>,
    /// Samples evicted from the head by this append.
    pub evicted: usize,
    pub buffered: usize,
}

pub struct MonitorSession {
    history: HistoryBuffer,
    predictor: PredictorCfg,
    status: StatusCfg,
    export: ExportCfg,
    alerts: AlertTracker,
    subscribers: Vec<xch::Sender<SessionEvent>>,
    last: Option<SessionEvent>,
    seq: u64,
    clock: Box<dyn Clock + Send + Sync>,
}

impl core::fmt::Debug for MonitorSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MonitorSession")
            .field("buffered", &self.history.len())
            .field("capacity", &self.history.capacity())
            .field("seq", &self.seq)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl MonitorSession {
    pub fn builder() -> MonitorSessionBuilder {
        MonitorSessionBuilder::default()
    }

    /// Record a sample and derive the new prediction/status pair.
    pub fn append(&mut self, sample: Sample) -> SessionEvent {
        if let Some(prev) = self.history.latest()
            && sample.timestamp < prev.timestamp
        {
            tracing::warn!(
                prev = %prev.timestamp,
                got = %sample.timestamp,
                "out-of-order sample accepted"
            );
        }
        let latest = sample.clone();
        let evicted = self.history.append(sample);
        self.seq += 1;
        let event = self.derive(latest, evicted);

        for a in &event.alerts {
            tracing::info!(alert = %a, seq = event.seq, "alert");
        }
        tracing::debug!(
            seq = event.seq,
            buffered = event.buffered,
            prediction = %event.prediction,
            "derived"
        );

        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.last = Some(event.clone());
        event
    }

    fn derive(&mut self, sample: Sample, evicted: usize) -> SessionEvent {
        let now = self.clock.wall();
        let status = classify_sample(&sample, &self.status);

        let probes: Vec<ProbeForecast> = sample
            .probes
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let prediction = if p.has_target() {
                    let series = self.history.series(Channel::Probe(i));
                    predict(&series, p.temperature, p.target, &self.predictor, now)
                } else {
                    Prediction::Unknown
                };
                ProbeForecast {
                    id: p.id,
                    name: p.name.clone(),
                    temperature: p.temperature,
                    target: p.target,
                    prediction,
                }
            })
            .collect();

        let prediction = probes
            .first()
            .map_or(Prediction::Unknown, |f| f.prediction);

        let alerts = self.alerts.observe(
            &status,
            probes
                .iter()
                .filter(|f| f.target > 0.0)
                .map(|f| (f.id, f.name.as_str(), f.temperature >= f.target)),
        );

        SessionEvent {
            seq: self.seq,
            sample,
            status,
            prediction,
            probes,
            alerts,
            evicted,
            buffered: self.history.len(),
        }
    }

    /// Receive every future `SessionEvent`. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> xch::Receiver<SessionEvent> {
        let (tx, rx) = xch::unbounded();
        self.subscribers.push(tx);
        rx
    }

    #[inline]
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    #[inline]
    pub fn latest(&self) -> Option<&Sample> {
        self.history.latest()
    }

    /// Most recent derive result; persists across source failures.
    #[inline]
    pub fn last_event(&self) -> Option<&SessionEvent> {
        self.last.as_ref()
    }

    #[inline]
    pub fn predictor_cfg(&self) -> &PredictorCfg {
        &self.predictor
    }

    #[inline]
    pub fn status_cfg(&self) -> &StatusCfg {
        &self.status
    }

    /// Current fan duty, 0 before the first sample.
    pub fn current_fan(&self) -> u8 {
        self.latest().map_or(0, |s| s.fan_duty)
    }

    /// Cook log of the buffer using the configured fan column.
    pub fn export_csv(&self) -> std::result::Result<String, MonitorError> {
        let fan = self.export.fan_column(self.current_fan());
        export_csv_with(&self.history, fan)
    }

    /// Drop all history and alert state (new cook). Subscribers are kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.alerts.reset();
        self.last = None;
        self.seq = 0;
    }
}

#[derive(Default)]
pub struct MonitorSessionBuilder {
    history: Option<HistoryCfg>,
    predictor: Option<PredictorCfg>,
    status: Option<StatusCfg>,
    export: Option<ExportCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl MonitorSessionBuilder {
    pub fn with_history(mut self, history: HistoryCfg) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_predictor(mut self, predictor: PredictorCfg) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn with_status(mut self, status: StatusCfg) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_export(mut self, export: ExportCfg) -> Self {
        self.export = Some(export);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Map a whole TOML config onto the builder.
    pub fn with_config(self, cfg: &pitwatch_config::Config) -> Self {
        self.with_history((&cfg.history).into())
            .with_predictor((&cfg.predictor).into())
            .with_status((&cfg.status).into())
            .with_export((&cfg.export).into())
    }

    pub fn build(self) -> Result<MonitorSession> {
        let history = self.history.unwrap_or_default();
        let predictor = self.predictor.unwrap_or_default();
        let status = self.status.unwrap_or_default();

        if history.capacity == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "history capacity must be >= 1",
            )));
        }
        if predictor.min_points < 2 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "predictor min_points must be >= 2",
            )));
        }
        if !(predictor.stall_slope.is_finite() && predictor.stall_slope >= 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "predictor stall_slope must be finite and >= 0",
            )));
        }
        if !(predictor.max_horizon_s.is_finite() && predictor.max_horizon_s > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "predictor max_horizon_s must be finite and > 0",
            )));
        }
        if !(status.lock_band > 0.0 && status.range_band > 0.0) {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "status bands must be > 0",
            )));
        }

        Ok(MonitorSession {
            history: HistoryBuffer::from(history),
            predictor,
            status,
            export: self.export.unwrap_or_default(),
            alerts: AlertTracker::new(),
            subscribers: Vec::new(),
            last: None,
            seq: 0,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
        })
    }
}
