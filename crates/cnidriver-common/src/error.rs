//! Unified error types for the CNI driver workspace.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CniDriverError {
    /// The metadata service could not be reached or returned unusable data.
    #[error("metadata service unavailable at {url}: {message}")]
    MetadataUnavailable {
        /// URL of the metadata request that failed.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value could not be rendered as JSON.
    #[error("failed to serialize {path}: {source}")]
    Serialization {
        /// Destination the value was being rendered for.
        path: PathBuf,
        /// Underlying serialization error.
        source: serde_json::Error,
    },

    /// No CNI config entry of a network names a plugin binary.
    #[error("network {network} declares no plugin \"type\" in its cniConfig")]
    MissingPluginType {
        /// Name of the offending network.
        network: String,
    },

    /// Provisioning a single network failed.
    #[error("failed to provision network {network}: {source}")]
    Network {
        /// Name of the network being provisioned.
        network: String,
        /// Underlying failure.
        source: Box<CniDriverError>,
    },

    /// The run finished without provisioning any network.
    #[error("no setup happened: no CNI network is configured for this host")]
    NothingConfigured,

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },
}

impl CniDriverError {
    /// Wraps `self` with the name of the network it occurred on.
    #[must_use]
    pub fn in_network(self, network: impl Into<String>) -> Self {
        Self::Network {
            network: network.into(),
            source: Box::new(self),
        }
    }

    /// Builds an [`CniDriverError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CniDriverError>;
