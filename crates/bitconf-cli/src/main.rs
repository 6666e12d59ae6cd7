//! bitconf CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use bitconf_cli::{Args, error_adapter::to_reportables};

fn main() {
    // Panics render through miette from here on
    miette::set_panic_hook();

    // Arguments come first so the log level is known
    let args = Args::parse();

    // Fall back to `warn` on an unknown level name
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    // Logs go to stderr; stdout carries the command output
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .target(env_logger::Target::Stderr)
        .init();

    info!(log_level:?; "Starting bitconf");
    debug!(args:?; "Parsed arguments");

    // Parse, format and write the configuration
    if let Err(err) = bitconf_cli::run(&args) {
        let reporter = miette::GraphicalReportHandler::new();

        // One report per diagnostic, each with its own source snippet
        for reportable in to_reportables(&err) {
            let mut writer = String::new();
            if reporter.render_report(&mut writer, &reportable).is_err() {
                // Plain message if the graphical render fails
                writer = reportable.to_string();
            }

            error!("{writer}");
        }

        process::exit(1);
    }

    info!("Completed successfully");
}
