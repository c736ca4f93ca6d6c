//! System-wide constants and default paths.

/// Root under which per-network CNI config directories are written.
pub const DEFAULT_CONFIG_ROOT: &str = "/opt/cni-driver";

/// Directory receiving the namespace-entry wrapper executables.
pub const DEFAULT_BIN_DIR: &str = "/opt/cni-driver/bin";

/// Namespace-entry primitive invoked by the wrapper scripts.
pub const DEFAULT_NSENTER_PATH: &str = "/usr/bin/nsenter";

/// Default address of the metadata service.
pub const DEFAULT_METADATA_ADDRESS: &str = "169.254.169.250";

/// Metadata API version path appended to the service address.
pub const METADATA_API_VERSION: &str = "2016-07-29";

/// Environment variable overriding the metadata address.
pub const METADATA_ADDRESS_ENV: &str = "RANCHER_METADATA_ADDRESS";

/// Suffix appended to a network name to form its config directory.
pub const CONFIG_DIR_SUFFIX: &str = ".d";

/// Name of the slot whose directory links to the default network.
pub const MANAGED_NAME: &str = "managed";

/// Key of the network metadata entry holding the CNI config set.
pub const CNI_CONFIG_KEY: &str = "cniConfig";

/// Field of a CNI config naming the plugin binary.
pub const PLUGIN_TYPE_FIELD: &str = "type";

/// Mode of config directories and the wrapper directory.
pub const DIR_MODE: u32 = 0o700;

/// Mode of rendered CNI config files.
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Mode of wrapper executables.
pub const WRAPPER_MODE: u32 = 0o700;

/// Application name used in logs and CLI output.
pub const APP_NAME: &str = "rancher-cni-driver";
