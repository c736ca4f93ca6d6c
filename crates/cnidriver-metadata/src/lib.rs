//! # cnidriver-metadata
//!
//! Access to the cluster metadata service.
//!
//! The provisioning engine only depends on the [`MetadataSource`] trait;
//! [`client::MetadataClient`] implements it over HTTP and is the only
//! piece that ever blocks waiting on the network.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod client;

use cnidriver_common::error::Result;
use cnidriver_common::types::{Host, Network};

pub use client::MetadataClient;

/// Read-only view of the records the provisioning run consumes.
pub trait MetadataSource {
    /// Returns every network known to the metadata service.
    ///
    /// # Errors
    ///
    /// Returns an error if the networks cannot be fetched or decoded.
    fn networks(&self) -> Result<Vec<Network>>;

    /// Returns the record of the host this process runs on.
    ///
    /// # Errors
    ///
    /// Returns an error if the host record cannot be fetched or decoded.
    fn self_host(&self) -> Result<Host>;
}
