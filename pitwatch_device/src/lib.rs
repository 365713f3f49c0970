#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sample sources: the live controller client and the demo generator.

pub mod demo;
pub mod error;
pub mod http;

pub use demo::DemoSource;
pub use error::DeviceError;
pub use http::{Endpoint, HttpDevice};

use pitwatch_config::{Config, SourceMode};
use pitwatch_traits::SampleSource;

/// Build the source selected by `[source].mode`.
pub fn build_source(cfg: &Config) -> error::Result<Box<dyn SampleSource + Send>> {
    match cfg.source.mode {
        SourceMode::Demo => {
            tracing::info!(seed = ?cfg.demo.seed, "using demo source");
            Ok(Box::new(DemoSource::new(&cfg.demo)))
        }
        SourceMode::Live => {
            let dev = HttpDevice::from_config(cfg)?;
            tracing::info!(url = %dev.endpoint().url(), "using live device");
            Ok(Box::new(dev))
        }
    }
}
