//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pitwatch", version, about = "Smoker/grill telemetry monitor")]
pub struct Cli {
    /// Path to config TOML; built-in defaults (demo mode) when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines (events, results, errors and logs) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); falls back to logging.level, then warn
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the source and print status and forecast per sample
    Monitor {
        /// Poll the live device (overrides source.mode)
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "demo")]
        live: bool,
        /// Use the synthetic demo generator (overrides source.mode)
        #[arg(long, action = ArgAction::SetTrue)]
        demo: bool,
        /// Device address (overrides source.device_ip)
        #[arg(long, value_name = "ADDR")]
        ip: Option<String>,
        /// Stop after this many successful samples
        #[arg(long, value_name = "N")]
        samples: Option<u64>,
        /// Poll cadence in ms (overrides the configured cadence)
        #[arg(long = "refresh-ms", value_name = "MS")]
        refresh_ms: Option<u64>,
        /// Write the cook log CSV on exit, into DIR or export.dir
        #[arg(long, value_name = "DIR", num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },
    /// Forecast completion from an exported cook log
    Forecast {
        /// Cook log written by `monitor --export`
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
        /// Target probe temperature
        #[arg(long)]
        target: f64,
        /// Reference instant (RFC 3339); defaults to the last row's timestamp
        #[arg(long, value_name = "RFC3339")]
        now: Option<String>,
    },
    /// Validate the config and reach the configured source once
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}

#[inline]
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}
