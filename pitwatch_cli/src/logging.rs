//! tracing-subscriber setup: console layer on stderr plus an optional
//! non-blocking file sink from `[logging]`.

use pitwatch_config::Logging;
use std::ffi::OsString;
use std::path::Path;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::FILE_GUARD;

/// Install the global subscriber once. `RUST_LOG` wins over `--log-level`,
/// which wins over `logging.level`.
pub fn init_tracing(json: bool, cli_level: Option<&str>, cfg: &Logging) {
    let level = cli_level.or(cfg.level.as_deref()).unwrap_or("warn");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_target(false).with_writer(std::io::stderr).boxed()
    };

    let file = cfg.file.as_deref().map(|path| {
        let path = Path::new(path);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| OsString::from("pitwatch.log"), ToOwned::to_owned);
        let appender = match cfg.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_ansi(false).with_writer(writer)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
}
