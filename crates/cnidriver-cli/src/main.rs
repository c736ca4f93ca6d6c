//! # rancher-cni-driver
//!
//! Waits for the metadata service, then writes the CNI config and plugin
//! wrappers of every network local to this host. Exits non-zero when
//! nothing could be set up.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = cli::execute(&cli) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}
