//! End-to-end provisioning run.

use std::path::PathBuf;

use cnidriver_common::config::DriverConfig;
use cnidriver_common::constants;
use cnidriver_common::error::{CniDriverError, Result};
use cnidriver_common::types::{CniConfigSet, Host, Network};
use cnidriver_metadata::{MetadataClient, MetadataSource};
use nix::unistd::Pid;

use crate::conf::ConfigWriter;
use crate::keywords;
use crate::selector;
use crate::wrapper::{self, WrapperProvisioner};

/// Outcome for one successfully provisioned network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedNetwork {
    /// Network name.
    pub name: String,
    /// Directory holding the rendered config files.
    pub config_dir: PathBuf,
    /// Plugin binary the wrapper stands in for.
    pub plugin: String,
    /// Path of the installed wrapper.
    pub wrapper: PathBuf,
    /// Whether `managed.d` was pointed at this network.
    pub default: bool,
}

/// Connects to the metadata service and provisions this host.
///
/// Blocks until the metadata service is reachable, as configured by
/// `config.wait`. Wrappers target the parent of the current process.
///
/// # Errors
///
/// Returns an error if the metadata service stays unavailable, if any
/// network fails to provision, or if no network was provisioned at all.
pub fn run(config: &DriverConfig) -> Result<Vec<ProvisionedNetwork>> {
    let url = config.metadata_url();
    tracing::info!(url = %url, "waiting for metadata");
    let client = MetadataClient::connect_and_wait(url, config.wait)?;
    provision(&client, config, wrapper::parent_pid())
}

/// Provisions every local CNI network known to `source`.
///
/// Networks are handled in order; the first failing network aborts the
/// run. When several local networks are marked default, the last one
/// processed ends up owning `managed.d`.
///
/// # Errors
///
/// Returns the metadata error, the first per-network failure wrapped in
/// [`CniDriverError::Network`], or [`CniDriverError::NothingConfigured`]
/// when no network qualified.
pub fn provision(
    source: &dyn MetadataSource,
    config: &DriverConfig,
    target: Pid,
) -> Result<Vec<ProvisionedNetwork>> {
    let networks = source.networks()?;
    let host = source.self_host()?;

    let writer = ConfigWriter::new(&config.config_root);
    let wrappers = WrapperProvisioner::from_config(config, target);

    let mut provisioned = Vec::new();
    for candidate in selector::local_cni_networks(&networks, &host) {
        let done = provision_network(&writer, &wrappers, candidate.network, candidate.config, &host)
            .map_err(|e| e.in_network(&candidate.network.name))?;
        provisioned.push(done);
    }

    if provisioned.is_empty() {
        return Err(CniDriverError::NothingConfigured);
    }
    tracing::info!(count = provisioned.len(), "CNI setup succeeded");
    Ok(provisioned)
}

fn provision_network(
    writer: &ConfigWriter,
    wrappers: &WrapperProvisioner,
    network: &Network,
    config: &CniConfigSet,
    host: &Host,
) -> Result<ProvisionedNetwork> {
    let plugin = plugin_name(network, config, host)?;

    tracing::info!(network = %network.name, "setting up CNI config files");
    let config_dir = writer.write(network, config, host)?;

    tracing::info!(network = %network.name, plugin = %plugin, "setting up CNI wrapper binary");
    let wrapper = wrappers.write(&plugin)?;

    Ok(ProvisionedNetwork {
        name: network.name.clone(),
        config_dir,
        plugin,
        wrapper,
        default: network.default,
    })
}

/// Determines the plugin binary a network's config set names.
///
/// Entries are examined in file-name order after substitution; the last
/// one carrying a string `type` wins.
///
/// # Errors
///
/// Returns [`CniDriverError::MissingPluginType`] if no entry has a `type`.
pub fn plugin_name(network: &Network, config: &CniConfigSet, host: &Host) -> Result<String> {
    let mut entries: Vec<_> = config.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let types: Vec<String> = entries
        .into_iter()
        .filter_map(|(_, raw)| {
            keywords::substitute(raw, host)
                .get(constants::PLUGIN_TYPE_FIELD)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .collect();

    let Some(last) = types.last() else {
        return Err(CniDriverError::MissingPluginType {
            network: network.name.clone(),
        });
    };
    if types.iter().any(|t| t != last) {
        tracing::warn!(network = %network.name, types = ?types, chosen = %last, "cniConfig names several plugin types");
    }
    Ok(last.clone())
}
