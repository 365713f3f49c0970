#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors are fine; validate() and the runtime conversions must not panic.
    if let Ok(cfg) = pitwatch_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let _ = pitwatch_core::MonitorSession::builder()
                .with_config(&cfg)
                .build();
        }
    }
});
