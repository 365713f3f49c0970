//! Common time/period helpers for pitwatch_core.

/// Clamp a configured cadence to at least 1 ms and turn it into a Duration.
#[inline]
pub fn period(ms: u64) -> std::time::Duration {
    std::time::Duration::from_millis(ms.max(1))
}

/// Format a number of seconds as `Hh MMm` (e.g. `5h 07m`), for countdowns.
pub fn format_remaining(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0h 00m".to_string();
    }
    let total_min = (seconds / 60.0).round() as u64;
    format!("{}h {:02}m", total_min / 60, total_min % 60)
}
