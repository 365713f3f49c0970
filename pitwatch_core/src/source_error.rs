//! Maps `Box<dyn Error>` from the `SampleSource` seam to a typed `MonitorError`.
//!
//! The trait uses `Box<dyn Error + Send + Sync>` for flexibility; this module
//! converts those to our typed error enum, with an optional feature-gated
//! path for `pitwatch_device::DeviceError` downcasting.

use crate::error::MonitorError;

/// Map a source error to a typed `MonitorError`.
///
/// Attempts to downcast known device error types first, then falls back
/// to string-based heuristics.
pub fn map_source_error(e: &(dyn std::error::Error + 'static)) -> MonitorError {
    #[cfg(feature = "device-errors")]
    {
        use pitwatch_device::error::DeviceError;
        if let Some(dev) = e.downcast_ref::<DeviceError>() {
            return match dev {
                DeviceError::Timeout => MonitorError::Timeout,
                DeviceError::InvalidConfiguration(msg) => {
                    MonitorError::InvalidConfiguration(msg.clone())
                }
                other => MonitorError::SourceUnreachable(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timed out") || s.to_lowercase().contains("timeout") {
        MonitorError::Timeout
    } else {
        MonitorError::SourceUnreachable(s)
    }
}
