//! Integration tests for a full provisioning pass.
//!
//! These tests are implemented in:
//! `crates/cnidriver-core/tests/provision_test.rs`
//!
//! Covered scenarios:
//! - `provisions_default_network_end_to_end`: config file, managed link, and wrapper for one network
//! - `foreign_environment_produces_no_files`: networks of other environments are skipped
//! - `no_local_network_is_nothing_configured`: an empty run is reported as a failure
//! - `switching_default_between_runs_repoints_link`: `managed.d` follows the default network
//! - `rerun_is_idempotent`: a second pass rewrites byte-identical files
//! - `wrapper_directory_defect_is_repaired`: a directory at the wrapper path is replaced
//! - `missing_plugin_type_fails_the_run_with_network_context`: errors name the network
//! - `metadata_errors_propagate`: metadata failures abort the run
