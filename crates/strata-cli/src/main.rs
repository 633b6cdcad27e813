//! `prerender` entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, info};
use miette::GraphicalReportHandler;

use strata_cli::{Args, error_adapter::render_reports};

fn init_logger(level: &str) {
    let level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
}

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);

    info!(input = args.input; "Starting prerender");
    debug!(args:?; "Parsed arguments");

    match strata_cli::run(&args) {
        Ok(()) => info!("Completed successfully"),
        Err(err) => {
            debug!(err:? = err; "Pre-render failed");
            // Reports go to stderr regardless of the log level.
            eprint!("{}", render_reports(&err, &GraphicalReportHandler::new()));
            process::exit(1);
        }
    }
}
