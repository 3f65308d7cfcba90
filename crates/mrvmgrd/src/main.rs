//! mrvmgrd daemon entry point.
//!
//! Loads the switch configuration, builds the driver facade and runs
//! the periodic sync worker until the process is signalled.

use std::process::ExitCode;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use mrvmgrd::MrvDriver;

/// Default config location; override with the first argument.
const DEFAULT_CONFIG_PATH: &str = "/etc/mrvmgrd/config.yaml";

/// Initialize tracing/logging.
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("--- Starting mrvmgrd ---");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut driver = match MrvDriver::from_config_file(&config_path) {
        Ok(driver) => driver,
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };

    driver.start();
    info!("Sync worker started; waiting for shutdown signal");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Shutting down");
    driver.stop().await;

    ExitCode::SUCCESS
}
