#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the pit monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty file yields a demo-mode monitor.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Synthetic generator; no device needed.
    #[default]
    Demo,
    /// Poll a physical controller over HTTP.
    Live,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceCfg {
    pub mode: SourceMode,
    /// Device address (host or host:port). Required in live mode.
    pub device_ip: Option<String>,
    /// Optional proxy base URL serving `GET /api/status?ip=<addr>`.
    pub proxy_url: Option<String>,
    /// Poll cadence in milliseconds.
    pub refresh_ms: u64,
    /// Per-request timeout in milliseconds. Also accepts alias "request_timeout_ms".
    #[serde(alias = "request_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SourceCfg {
    fn default() -> Self {
        Self {
            mode: SourceMode::Demo,
            device_ip: None,
            proxy_url: None,
            refresh_ms: 3000,
            timeout_ms: 4000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryCfg {
    /// Maximum number of samples kept in memory.
    pub capacity: usize,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PredictorCfg {
    /// Below this many buffered samples the forecast is unknown.
    pub min_points: usize,
    /// Trailing samples used for the fit (raised to `min_points` when smaller).
    pub regression_window: usize,
    /// Trailing moving-average window applied before the fit.
    pub smooth_window: usize,
    /// Slopes at or below this (degrees per second) count as stalled.
    pub stall_slope: f64,
    /// Longest projection reported, in seconds.
    pub max_horizon_s: u64,
}

impl Default for PredictorCfg {
    fn default() -> Self {
        Self {
            min_points: 8,
            regression_window: 12,
            smooth_window: 3,
            stall_slope: 0.0005,
            max_horizon_s: 48 * 3600,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StatusCfg {
    /// Pit set-point used when the device does not report one.
    pub pit_target: f64,
    /// Pit is "locked" while strictly closer than this to the set-point.
    pub lock_band: f64,
    /// Pit is "hot"/"cold" once further than this from the set-point.
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportCfg {
    /// Write each sample's own fan duty instead of the current one.
    pub per_sample_fan: bool,
    /// Directory receiving `cook_log_<date>.csv`.
    pub dir: String,
}

impl Default for ExportCfg {
    fn default() -> Self {
        Self {
            per_sample_fan: false,
            dir: ".".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DemoCfg {
    pub pit_start: f64,
    pub pit_set: f64,
    pub meat_start: f64,
    pub meat_target: f64,
    pub fan_start: u8,
    /// Peak-to-peak pit noise in degrees.
    pub noise: f64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    /// Tick cadence used by the demo generator (ms).
    pub refresh_ms: u64,
}

impl Default for DemoCfg {
    fn default() -> Self {
        Self {
            pit_start: 215.0,
            pit_set: 225.0,
            meat_start: 150.0,
            meat_target: 195.0,
            fan_start: 20,
            noise: 1.5,
            seed: None,
            refresh_ms: 2000,
        }
    }
}

/// One probe entry in the device field map.
#[derive(Debug, Deserialize, Clone)]
pub struct ProbeField {
    pub id: u32,
    pub name: String,
    /// JSON pointer to the probe temperature.
    pub temp: String,
    /// JSON pointer to the probe target; absent means no target.
    #[serde(default)]
    pub target: Option<String>,
}

/// JSON pointers (RFC 6901) locating readings in the device's `/json` body.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FieldMap {
    pub pit: String,
    pub pit_set: Option<String>,
    pub fan: String,
    pub probes: Vec<ProbeField>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            pit: "/pitTemp".to_string(),
            pit_set: Some("/pitSet".to_string()),
            fan: "/fanSpeed".to_string(),
            probes: vec![
                ProbeField {
                    id: 1,
                    name: "Probe 1".to_string(),
                    temp: "/probes/0/temp".to_string(),
                    target: Some("/probes/0/target".to_string()),
                },
                ProbeField {
                    id: 2,
                    name: "Ambient".to_string(),
                    temp: "/probes/1/temp".to_string(),
                    target: None,
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DeviceCfg {
    pub fields: FieldMap,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceCfg,
    pub history: HistoryCfg,
    pub predictor: PredictorCfg,
    pub status: StatusCfg,
    pub export: ExportCfg,
    pub demo: DemoCfg,
    pub device: DeviceCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_path(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn is_pointer(p: &str) -> bool {
    p.is_empty() || p.starts_with('/')
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Source
        if self.source.refresh_ms == 0 {
            eyre::bail!("source.refresh_ms must be >= 1");
        }
        if self.source.timeout_ms == 0 {
            eyre::bail!("source.timeout_ms must be >= 1");
        }
        if self.source.mode == SourceMode::Live {
            match self.source.device_ip.as_deref().map(str::trim) {
                None | Some("") => {
                    eyre::bail!("invalid configuration: source.device_ip is missing for live mode")
                }
                Some(_) => {}
            }
        }
        if let Some(proxy) = self.source.proxy_url.as_deref()
            && !(proxy.starts_with("http://") || proxy.starts_with("https://"))
        {
            eyre::bail!("source.proxy_url must start with http:// or https://");
        }

        // History
        if self.history.capacity == 0 {
            eyre::bail!("history.capacity must be >= 1");
        }

        // Predictor
        if self.predictor.min_points < 2 {
            eyre::bail!("predictor.min_points must be >= 2");
        }
        if self.predictor.regression_window == 0 {
            eyre::bail!("predictor.regression_window must be >= 1");
        }
        if self.predictor.smooth_window == 0 {
            eyre::bail!("predictor.smooth_window must be >= 1");
        }
        if !self.predictor.stall_slope.is_finite() || self.predictor.stall_slope < 0.0 {
            eyre::bail!("predictor.stall_slope must be finite and >= 0");
        }
        if self.predictor.max_horizon_s == 0 {
            eyre::bail!("predictor.max_horizon_s must be >= 1");
        }

        // Status
        if !self.status.pit_target.is_finite() {
            eyre::bail!("status.pit_target must be finite");
        }
        if !(self.status.lock_band.is_finite() && self.status.lock_band > 0.0) {
            eyre::bail!("status.lock_band must be > 0");
        }
        if !(self.status.range_band.is_finite() && self.status.range_band > 0.0) {
            eyre::bail!("status.range_band must be > 0");
        }

        // Demo
        if self.demo.refresh_ms == 0 {
            eyre::bail!("demo.refresh_ms must be >= 1");
        }
        if !(self.demo.noise.is_finite() && self.demo.noise >= 0.0) {
            eyre::bail!("demo.noise must be finite and >= 0");
        }
        if self.demo.fan_start > 100 {
            eyre::bail!("demo.fan_start must be in [0, 100]");
        }

        // Device field map
        let f = &self.device.fields;
        let mut pointers = vec![f.pit.as_str(), f.fan.as_str()];
        pointers.extend(f.pit_set.as_deref());
        for p in &f.probes {
            pointers.push(p.temp.as_str());
            pointers.extend(p.target.as_deref());
        }
        if let Some(bad) = pointers.into_iter().find(|p| !is_pointer(p)) {
            eyre::bail!("device.fields entry {bad:?} is not a JSON pointer (must start with '/')");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
