//! Human-readable error descriptions, exit codes and structured JSON errors.

use pitwatch_core::{BuildError, MonitorError};
use pitwatch_device::DeviceError;

pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_INVALID_CONFIG: i32 = 3;
pub const EXIT_UNREACHABLE: i32 = 4;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in [history], [predictor] or [status].\nHow to fix: Edit the config file, then rerun."
        );
    }

    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::InvalidConfiguration(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Live mode without source.device_ip, or out-of-range values in the TOML.\nHow to fix: Set the device address (--ip or source.device_ip) or fix the config, then rerun."
            ),
            MonitorError::SourceUnreachable(msg) => format!(
                "What happened: The device could not be reached ({msg}).\nLikely causes: Wrong IP address, controller offline, or proxy not running.\nHow to fix: Check the address and network, or try `pitwatch monitor --demo`."
            ),
            MonitorError::Timeout => "What happened: The device did not answer in time.\nLikely causes: Weak Wi-Fi or an overloaded controller.\nHow to fix: Raise source.timeout_ms in the config.".to_string(),
            MonitorError::Export(msg) => format!(
                "What happened: Cook log error ({msg}).\nLikely causes: File not written by pitwatch, edited by hand, or wrong header row.\nHow to fix: Expected header 'Timestamp,Pit Temp,Meat 1 Temp,Fan Speed'."
            ),
            MonitorError::Io(msg) => format!(
                "What happened: File system error ({msg}).\nHow to fix: Check the path exists and is writable."
            ),
        };
    }

    if let Some(de) = err.downcast_ref::<DeviceError>() {
        if let DeviceError::InvalidConfiguration(msg) = de {
            return format!(
                "What happened: Invalid configuration ({msg}).\nHow to fix: Set source.device_ip (or pass --ip) and check source.proxy_url."
            );
        }
        return format!(
            "What happened: Device error ({de}).\nLikely causes: Controller offline or unexpected JSON shape.\nHow to fix: Check the address and the [device.fields] pointers."
        );
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read config") {
        return format!("What happened: Could not read the config file.\nHow to fix: Check the --config path. Original: {msg}");
    }
    if lower.starts_with("parse config") {
        return format!("What happened: The config file is not valid TOML for pitwatch.\nHow to fix: Fix the reported line. Original: {msg}");
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable process exit codes; clap usage errors exit 2 on their own.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return EXIT_INVALID_CONFIG;
    }
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::InvalidConfiguration(_) => EXIT_INVALID_CONFIG,
            MonitorError::SourceUnreachable(_) | MonitorError::Timeout => EXIT_UNREACHABLE,
            MonitorError::Export(_) | MonitorError::Io(_) => EXIT_GENERIC,
        };
    }
    if let Some(de) = err.downcast_ref::<DeviceError>() {
        return match de {
            DeviceError::InvalidConfiguration(_) => EXIT_INVALID_CONFIG,
            _ => EXIT_UNREACHABLE,
        };
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.starts_with("read config") || lower.starts_with("parse config") {
        return EXIT_INVALID_CONFIG;
    }
    EXIT_GENERIC
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        EXIT_INVALID_CONFIG => "InvalidConfiguration",
        EXIT_UNREACHABLE => "SourceUnreachable",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
    })
    .to_string()
}
