//! Offline column profiler.
//!
//! Reads an exported catalog snapshot, synthesizes a frequency distribution for every column from its quantile and
//! frequent-value statistics, and writes one distribution file per column, plus a domain file for every column whose
//! values are fully enumerated.

#![deny(warnings)]
#![deny(missing_docs)]

use anyhow::Error;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod config;
use self::config::Config;

mod driver;
use self::driver::Driver;

fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(true)
        .with_target(true)
        .init();

    match run() {
        Ok(()) => info!("column-profiler stopped."),
        Err(e) => {
            error!("{:?}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<(), Error> {
    info!("column-profiler starting...");

    // We only accept a single command line argument: the path to the configuration file.
    let config_path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            error!(
                "Path to the configuration file must be passed as the first (and only) argument to `column-profiler`."
            );
            std::process::exit(1);
        }
    };

    let config = Config::try_from_file(&config_path)?;
    let summary = Driver::new(config).run()?;

    info!(
        profiled = summary.profiled,
        skipped = summary.skipped,
        domain_files = summary.domain_files,
        "Profiling complete."
    );

    Ok(())
}
