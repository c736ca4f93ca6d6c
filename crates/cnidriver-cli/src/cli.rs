//! Command-line arguments and dispatch.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use cnidriver_common::config::{DriverConfig, WaitPolicy};
use cnidriver_common::constants;

/// Sets up CNI config files and namespace-entry plugin wrappers.
#[derive(Parser, Debug)]
#[command(name = constants::APP_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Metadata address to use.
    #[arg(
        long,
        env = constants::METADATA_ADDRESS_ENV,
        default_value = constants::DEFAULT_METADATA_ADDRESS
    )]
    pub metadata_address: String,

    /// Turn on debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Root directory for per-network CNI config directories.
    #[arg(long, default_value = constants::DEFAULT_CONFIG_ROOT)]
    pub config_root: PathBuf,

    /// Directory for plugin wrapper executables.
    #[arg(long, default_value = constants::DEFAULT_BIN_DIR)]
    pub bin_dir: PathBuf,

    /// Stop waiting for metadata after this many attempts (default: wait forever).
    #[arg(long)]
    pub metadata_wait_attempts: Option<u32>,

    /// Seconds between two metadata connection attempts.
    #[arg(long, default_value_t = 1)]
    pub metadata_wait_interval: u64,
}

impl Cli {
    /// Builds the driver configuration from the parsed arguments.
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            config_root: self.config_root.clone(),
            bin_dir: self.bin_dir.clone(),
            metadata_address: self.metadata_address.clone(),
            wait: WaitPolicy {
                interval: Duration::from_secs(self.metadata_wait_interval),
                max_attempts: self.metadata_wait_attempts,
            },
            ..DriverConfig::default()
        }
    }
}

/// Runs one provisioning pass.
///
/// # Errors
///
/// Returns an error if the metadata service stays unavailable or no
/// network could be provisioned.
pub fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.driver_config();
    let networks = cnidriver_core::provision::run(&config).context("failed to setup CNI")?;
    for network in &networks {
        tracing::info!(
            network = %network.name,
            config_dir = %network.config_dir.display(),
            wrapper = %network.wrapper.display(),
            default = network.default,
            "network provisioned"
        );
    }
    Ok(())
}
