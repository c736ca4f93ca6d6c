//! Selection of the networks this host must configure.

use cnidriver_common::types::{CniConfigSet, Host, Network};

/// A network local to the host together with its CNI config set.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The selected network.
    pub network: &'a Network,
    /// Its `cniConfig` metadata object.
    pub config: &'a CniConfigSet,
}

/// Returns the networks of the host's environment that declare a `cniConfig`.
///
/// Input order is preserved. Skipped networks are not errors; they are
/// only reported at debug level.
pub fn local_cni_networks<'a>(networks: &'a [Network], host: &Host) -> Vec<Candidate<'a>> {
    networks
        .iter()
        .filter_map(|network| {
            if !network.is_local_to(host) {
                tracing::debug!(network = %network, "not local to this environment");
                return None;
            }
            let Some(config) = network.cni_config() else {
                tracing::debug!(network = %network, "not a CNI network");
                return None;
            };
            Some(Candidate { network, config })
        })
        .collect()
}
