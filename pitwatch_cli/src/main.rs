#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod cli;
mod error_fmt;
mod logging;
mod monitor;

use clap::Parser;
use eyre::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::monitor::{MonitorArgs, run_forecast, run_monitor, run_self_check};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    // Plain panic/report hooks; the CLI prints its own error text.
    let _ = color_eyre::install();

    if let Err(err) = real_main(cli) {
        if cli::json_mode() {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        tracing::debug!(error = ?err, "command failed");
        std::process::exit(exit_code_for_error(&err));
    }
}

fn load_config(cli: &Cli) -> Result<pitwatch_config::Config> {
    match &cli.config {
        Some(path) => pitwatch_config::load_path(path).map_err(|e| {
            let msg = e.to_string();
            if msg.starts_with("read config") || msg.starts_with("parse config") {
                e
            } else {
                monitor::invalid_config(&e)
            }
        }),
        None => Ok(pitwatch_config::Config::default()),
    }
}

fn real_main(cli: Cli) -> Result<()> {
    if matches!(cli.cmd, Commands::Health) {
        println!("ok");
        return Ok(());
    }

    let cfg = load_config(&cli)?;
    logging::init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);
    tracing::debug!(config = ?cli.config, "config loaded");

    match cli.cmd {
        Commands::Monitor {
            live,
            demo,
            ip,
            samples,
            refresh_ms,
            export,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "could not install Ctrl-C handler");
            }
            let args = MonitorArgs {
                live,
                demo,
                ip,
                samples,
                refresh_ms,
                export,
            };
            run_monitor(cfg, &args, shutdown)
        }
        Commands::Forecast { csv, target, now } => {
            run_forecast(&cfg, &csv, target, now.as_deref())
        }
        Commands::SelfCheck => run_self_check(&cfg),
        Commands::Health => Ok(()),
    }
}
