//! Namespace-entry wrappers for CNI plugin binaries.
//!
//! The container runtime invokes `<bin_dir>/<plugin>` from inside its own
//! namespaces. The wrapper re-enters the mount, UTS, IPC, network, and PID
//! namespaces of the process that launched this driver, then execs its own
//! path there, which resolves to the real plugin on the host.

use std::fs::{self, Permissions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use cnidriver_common::config::DriverConfig;
use cnidriver_common::constants;
use cnidriver_common::error::{CniDriverError, Result};
use nix::unistd::Pid;

use crate::conf::{create_private_dir, validate_name};

/// Returns the parent process ID of the current process.
#[must_use]
pub fn parent_pid() -> Pid {
    nix::unistd::getppid()
}

/// Writes wrapper scripts bound to one target process.
#[derive(Debug, Clone)]
pub struct WrapperProvisioner {
    bin_dir: PathBuf,
    nsenter: PathBuf,
    target: Pid,
}

impl WrapperProvisioner {
    /// Creates a provisioner whose wrappers enter the namespaces of `target`.
    pub fn new(bin_dir: impl Into<PathBuf>, nsenter: impl Into<PathBuf>, target: Pid) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            nsenter: nsenter.into(),
            target,
        }
    }

    /// Creates a provisioner from the driver configuration.
    #[must_use]
    pub fn from_config(config: &DriverConfig, target: Pid) -> Self {
        Self::new(&config.bin_dir, &config.nsenter_path, target)
    }

    /// Returns the final path of the wrapper for `plugin`.
    #[must_use]
    pub fn wrapper_path(&self, plugin: &str) -> PathBuf {
        self.bin_dir.join(plugin)
    }

    /// Renders the wrapper script.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "#!/bin/sh\nexec {} -m -u -i -n -p -t {} -- $0 \"$@\"\n",
            self.nsenter.display(),
            self.target
        )
    }

    /// Atomically installs the wrapper for `plugin` and returns its path.
    ///
    /// The script is written to a temporary file in the binary directory
    /// and renamed over the final path, so the final path never holds a
    /// partial script. A directory squatting on the final path (left by a
    /// bind mount that was set up before the file existed) is removed first.
    ///
    /// # Errors
    ///
    /// Returns an error if `plugin` is not a plain file name, or if the
    /// directory, temporary file, directory removal, or rename fails.
    pub fn write(&self, plugin: &str) -> Result<PathBuf> {
        validate_name("CNI plugin", plugin)?;
        create_private_dir(&self.bin_dir)?;

        tracing::debug!(ppid = %self.target, "wrapper target process");
        let path = self.wrapper_path(plugin);
        let content = self.render();
        tracing::debug!(path = %path.display(), content = %content, "writing CNI wrapper");

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{plugin}."))
            .suffix(".tmp")
            .tempfile_in(&self.bin_dir)
            .map_err(|e| CniDriverError::io(&self.bin_dir, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .and_then(|()| {
                tmp.as_file()
                    .set_permissions(Permissions::from_mode(constants::WRAPPER_MODE))
            })
            .map_err(|e| CniDriverError::io(tmp.path(), e))?;

        remove_squatting_dir(&path)?;

        let _ = tmp
            .persist(&path)
            .map_err(|e| CniDriverError::io(&path, e.error))?;
        Ok(path)
    }
}

fn remove_squatting_dir(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            tracing::info!(path = %path.display(), "wrapper path is a directory, removing it");
            fs::remove_dir(path).map_err(|e| CniDriverError::io(path, e))
        }
        Err(e) if e.kind() != ErrorKind::NotFound => Err(CniDriverError::io(path, e)),
        _ => Ok(()),
    }
}
