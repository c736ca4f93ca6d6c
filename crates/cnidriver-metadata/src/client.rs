//! HTTP client for the metadata service.

use std::time::Duration;

use cnidriver_common::config::WaitPolicy;
use cnidriver_common::error::{CniDriverError, Result};
use cnidriver_common::types::{Host, Network};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::MetadataSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking client bound to one versioned metadata URL.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    base_url: String,
    http: Client,
}

impl MetadataClient {
    /// Creates a client without checking that the service is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CniDriverError::MetadataUnavailable {
                url: base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { base_url, http })
    }

    /// Creates a client and blocks until the service answers.
    ///
    /// Polls `<base_url>/version` every `policy.interval` until it returns
    /// a success status.
    ///
    /// # Errors
    ///
    /// Returns [`CniDriverError::MetadataUnavailable`] once
    /// `policy.max_attempts` attempts have failed.
    pub fn connect_and_wait(base_url: impl Into<String>, policy: WaitPolicy) -> Result<Self> {
        let client = Self::new(base_url)?;
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match client.get_text("version") {
                Ok(version) => {
                    tracing::debug!(url = %client.base_url, version = %version.trim(), "metadata is available");
                    return Ok(client);
                }
                Err(e) => {
                    if policy.max_attempts.is_some_and(|max| attempt >= max) {
                        return Err(e);
                    }
                    tracing::warn!(attempt, error = %e, "metadata not ready, retrying");
                    std::thread::sleep(policy.interval);
                }
            }
        }
    }

    /// Returns the versioned base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_text(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        let unavailable = |message: String| CniDriverError::MetadataUnavailable {
            url: url.clone(),
            message,
        };

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        response
            .text()
            .map_err(|e| unavailable(format!("failed to read response body: {e}")))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_text(path)?;
        decode(&self.url(path), &body)
    }
}

impl MetadataSource for MetadataClient {
    fn networks(&self) -> Result<Vec<Network>> {
        self.get_json("networks")
    }

    fn self_host(&self) -> Result<Host> {
        self.get_json("self/host")
    }
}

/// Decodes a metadata response body.
fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| CniDriverError::MetadataUnavailable {
        url: url.to_string(),
        message: format!("malformed response: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = MetadataClient::new("http://169.254.169.250/2016-07-29/").expect("client");
        assert_eq!(client.base_url(), "http://169.254.169.250/2016-07-29");
        assert_eq!(
            client.url("/self/host"),
            "http://169.254.169.250/2016-07-29/self/host"
        );
    }

    #[test]
    fn decode_networks_fixture() {
        let body = r#"[
            {"name": "ipsec", "uuid": "n1", "environment_uuid": "e1", "default": true,
             "metadata": {"cniConfig": {"10-ipsec.conf": {"type": "rancher-bridge"}}}},
            {"name": "host", "uuid": "n2", "environment_uuid": "e1", "metadata": {}}
        ]"#;
        let networks: Vec<Network> = decode("http://x/networks", body).expect("decode");
        assert_eq!(networks.len(), 2);
        assert!(networks[0].cni_config().is_some());
        assert!(!networks[1].default);
    }

    #[test]
    fn decode_host_fixture() {
        let body = r#"{"uuid": "h1", "name": "node-1", "hostname": "node-1.local",
            "agent_ip": "10.0.0.5", "environment_uuid": "e1",
            "labels": {"io.rancher.host.os": "linux"}}"#;
        let host: Host = decode("http://x/self/host", body).expect("decode");
        assert_eq!(host.agent_ip, "10.0.0.5");
        assert_eq!(host.label("io.rancher.host.os"), Some("linux"));
    }

    #[test]
    fn decode_garbage_is_metadata_error() {
        let err = decode::<Host>("http://x/self/host", "<html>").expect_err("should fail");
        assert!(matches!(err, CniDriverError::MetadataUnavailable { .. }));
    }

    #[test]
    fn wait_gives_up_after_max_attempts() {
        let policy = WaitPolicy {
            interval: Duration::from_millis(1),
            max_attempts: Some(2),
        };
        // Port 9 on loopback (discard) is not expected to serve HTTP.
        let err = MetadataClient::connect_and_wait("http://127.0.0.1:9/2016-07-29", policy)
            .expect_err("nothing listens there");
        assert!(matches!(err, CniDriverError::MetadataUnavailable { .. }));
    }
}
