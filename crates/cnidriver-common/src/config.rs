//! Runtime configuration model for the CNI driver.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Root configuration for one provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Root holding `<network>.d` directories and the managed link.
    pub config_root: PathBuf,
    /// Directory receiving the wrapper executables.
    pub bin_dir: PathBuf,
    /// Namespace-entry primitive embedded in wrapper scripts.
    pub nsenter_path: PathBuf,
    /// Address (host or host:port) of the metadata service.
    pub metadata_address: String,
    /// How long to wait for the metadata service.
    pub wait: WaitPolicy,
}

impl DriverConfig {
    /// Returns the versioned base URL of the metadata service.
    #[must_use]
    pub fn metadata_url(&self) -> String {
        format!(
            "http://{}/{}",
            self.metadata_address,
            constants::METADATA_API_VERSION
        )
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            config_root: PathBuf::from(constants::DEFAULT_CONFIG_ROOT),
            bin_dir: PathBuf::from(constants::DEFAULT_BIN_DIR),
            nsenter_path: PathBuf::from(constants::DEFAULT_NSENTER_PATH),
            metadata_address: constants::DEFAULT_METADATA_ADDRESS.to_string(),
            wait: WaitPolicy::default(),
        }
    }
}

/// Retry policy used while waiting for the metadata service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitPolicy {
    /// Pause between two connection attempts.
    pub interval: Duration,
    /// Give up after this many failed attempts; `None` waits forever.
    pub max_attempts: Option<u32>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn default_paths_match_driver_layout() {
        let config = DriverConfig::default();
        assert_eq!(config.config_root, Path::new("/opt/cni-driver"));
        assert_eq!(config.bin_dir, Path::new("/opt/cni-driver/bin"));
    }

    #[test]
    fn metadata_url_is_versioned() {
        let config = DriverConfig {
            metadata_address: "127.0.0.1:8080".into(),
            ..DriverConfig::default()
        };
        assert_eq!(config.metadata_url(), "http://127.0.0.1:8080/2016-07-29");
    }

    #[test]
    fn default_wait_is_unbounded() {
        assert_eq!(WaitPolicy::default().max_attempts, None);
    }
}
