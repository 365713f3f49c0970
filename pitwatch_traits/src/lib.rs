pub mod clock;
pub mod sample;

pub use clock::{Clock, SystemClock};
pub use sample::{Probe, Sample};

/// Anything that can produce one telemetry `Sample` per call: a live device
/// poller, a synthetic generator, or a replay of a recorded cook.
pub trait SampleSource {
    fn fetch(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Sample, Box<dyn std::error::Error + Send + Sync>>;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn fetch(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Sample, Box<dyn std::error::Error + Send + Sync>> {
        (**self).fetch(timeout)
    }
}
