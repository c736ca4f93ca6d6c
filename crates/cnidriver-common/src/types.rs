//! Domain records consumed from the metadata service.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants;

/// Mapping from CNI config file name to its raw (unsubstituted) content.
pub type CniConfigSet = Map<String, Value>;

/// The local machine, as reported by the metadata service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Unique identifier of the host.
    #[serde(default)]
    pub uuid: String,
    /// Display name of the host.
    #[serde(default)]
    pub name: String,
    /// Kernel hostname.
    #[serde(default)]
    pub hostname: String,
    /// Address the agent on this host is reachable at.
    #[serde(default)]
    pub agent_ip: String,
    /// Environment (cluster) this host belongs to.
    #[serde(default)]
    pub environment_uuid: String,
    /// Host labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Extra named per-host values available to substitution.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Host {
    /// Looks up a named host property.
    ///
    /// The built-in names map onto the host's own fields; anything else is
    /// resolved against [`Host::properties`].
    #[must_use]
    pub fn property(&self, name: &str) -> Option<Cow<'_, str>> {
        let builtin = match name {
            "HOST_UUID" => Some(&self.uuid),
            "HOST_NAME" => Some(&self.name),
            "HOSTNAME" => Some(&self.hostname),
            "AGENT_IP" => Some(&self.agent_ip),
            "ENVIRONMENT_UUID" => Some(&self.environment_uuid),
            _ => None,
        };
        builtin
            .or_else(|| self.properties.get(name))
            .map(|v| Cow::Borrowed(v.as_str()))
    }

    /// Looks up a host label.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// A cluster-visible network definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Network name; also names its config directory.
    pub name: String,
    /// Unique identifier of the network.
    #[serde(default)]
    pub uuid: String,
    /// Environment the network belongs to.
    #[serde(default)]
    pub environment_uuid: String,
    /// Whether this is the environment's default network.
    #[serde(default)]
    pub default: bool,
    /// Free-form metadata; may carry a `cniConfig` object.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Network {
    /// Returns the CNI config set, if the metadata carries one as an object.
    #[must_use]
    pub fn cni_config(&self) -> Option<&CniConfigSet> {
        self.metadata
            .get(constants::CNI_CONFIG_KEY)
            .and_then(Value::as_object)
    }

    /// Returns whether the network belongs to the host's environment.
    #[must_use]
    pub fn is_local_to(&self, host: &Host) -> bool {
        self.environment_uuid == host.environment_uuid
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uuid.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.uuid)
        }
    }
}
