//! # cnidriver-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the CNI driver workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives the metadata client, the
//! provisioning engine, and the CLI all build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
