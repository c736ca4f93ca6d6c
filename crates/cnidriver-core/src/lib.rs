//! # cnidriver-core
//!
//! Provisions per-network CNI configuration and plugin wrappers on a host.
//!
//! For every network local to this host that declares a `cniConfig`:
//! - **Substitution**: host placeholders inside the config are replaced
//!   with this host's values ([`keywords`]).
//! - **Config files**: each entry is written as indented JSON under
//!   `<root>/<network>.d`, and `managed.d` links to the default network
//!   ([`conf`]).
//! - **Wrapper**: a script named after the plugin re-enters the host
//!   namespaces of the parent process before exec'ing the real plugin
//!   ([`wrapper`]).
//!
//! [`provision`] drives the whole run; networks are handled one at a time.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod conf;
pub mod keywords;
pub mod provision;
pub mod selector;
pub mod wrapper;
