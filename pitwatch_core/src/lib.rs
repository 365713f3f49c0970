#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Telemetry buffering and completion forecasting for a smoker/grill
//! temperature controller (source-agnostic).
//!
//! All device interaction goes through `pitwatch_traits::SampleSource`.
//!
//! ## Architecture
//!
//! - **History**: fixed-capacity FIFO of samples (`history` module)
//! - **Smoothing**: trailing moving average (`smoothing` module)
//! - **Prediction**: least-squares trend to ETA with guardrails (`predictor` module)
//! - **Status**: lock/adjust, hot/cold, fan active/idle (`status` module)
//! - **Export**: cook-log CSV out and back in (`export` module)
//! - **Session**: owns the buffer, derives on every append, broadcasts events
//! - **Polling**: cancellable periodic source thread (`sampler`) and run loop (`runner`)

pub mod alerts;
pub mod atomic;
pub mod config;
pub mod conversions;
pub mod error;
pub mod export;
pub mod history;
pub mod mocks;
pub mod predictor;
pub mod runner;
pub mod sampler;
pub mod session;
pub mod smoothing;
pub mod source_error;
pub mod status;
pub mod util;

pub use alerts::Alert;
pub use config::{ExportCfg, FanColumn, HistoryCfg, PredictorCfg, StatusCfg};
pub use error::{BuildError, MonitorError};
pub use export::{LogRow, export_csv, export_csv_with, parse_csv};
pub use history::{Channel, HistoryBuffer, Point};
pub use predictor::{Eta, Prediction, predict};
pub use session::{MonitorSession, MonitorSessionBuilder, ProbeForecast, SessionEvent};
pub use smoothing::smooth;
pub use status::{FanState, LockState, RangeState, Status, classify, classify_sample};
