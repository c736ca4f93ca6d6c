//! Rendering of per-network CNI config directories.
//!
//! Each network gets `<root>/<network>.d/` holding one JSON file per
//! `cniConfig` entry. The default network is additionally reachable
//! through the relative symlink `<root>/managed.d -> <network>.d`.

use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::{DirBuilderExt, MetadataExt, OpenOptionsExt};
use std::path::{Component, Path, PathBuf};

use cnidriver_common::constants;
use cnidriver_common::error::{CniDriverError, Result};
use cnidriver_common::types::{CniConfigSet, Host, Network};

use crate::keywords;

/// Writes CNI config directories under a config root.
#[derive(Debug, Clone)]
pub struct ConfigWriter {
    root: PathBuf,
}

impl ConfigWriter {
    /// Creates a writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the config directory of the named network.
    #[must_use]
    pub fn network_dir(&self, network: &str) -> PathBuf {
        self.root.join(dir_name(network))
    }

    /// Returns the path of the managed link.
    #[must_use]
    pub fn managed_link(&self) -> PathBuf {
        self.network_dir(constants::MANAGED_NAME)
    }

    /// Writes every entry of `config` for `network`, then relinks
    /// `managed.d` if the network is the default one.
    ///
    /// A failing entry does not stop its siblings from being written; the
    /// last such failure is returned once all entries were attempted.
    ///
    /// # Errors
    ///
    /// Returns an error immediately if the network name is not a plain
    /// file name or the config directory cannot be created, otherwise the
    /// last per-file or relink error.
    pub fn write(&self, network: &Network, config: &CniConfigSet, host: &Host) -> Result<PathBuf> {
        validate_name("network", &network.name)?;
        let dir = self.network_dir(&network.name);
        create_private_dir(&dir)?;

        let mut last_err = None;
        for (file, raw) in config {
            let path = dir.join(file);
            let written = validate_name("CNI config file", file)
                .and_then(|()| write_json(&path, &keywords::substitute(raw, host)));
            if let Err(e) = written {
                tracing::warn!(network = %network.name, path = %path.display(), error = %e, "skipping CNI config file");
                last_err = Some(e);
            }
        }

        if network.default {
            if let Err(e) = self.link_managed(&network.name) {
                tracing::warn!(network = %network.name, error = %e, "failed to point managed link");
                last_err = Some(e);
            }
        }

        last_err.map_or(Ok(dir), Err)
    }

    /// Points `managed.d` at the config directory of `network`.
    ///
    /// Does nothing when the link already resolves to that directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `network` is not a plain file name, or if the
    /// stale entry cannot be removed or the symlink cannot be created.
    pub fn link_managed(&self, network: &str) -> Result<()> {
        validate_name("network", network)?;
        let link = self.managed_link();
        let target = self.network_dir(network);

        if same_file(&link, &target) {
            tracing::debug!(link = %link.display(), network, "managed link already current");
            return Ok(());
        }

        remove_entry(&link)?;
        std::os::unix::fs::symlink(dir_name(network), &link)
            .map_err(|e| CniDriverError::io(&link, e))?;
        tracing::info!(link = %link.display(), network, "managed link updated");
        Ok(())
    }
}

fn dir_name(network: &str) -> String {
    format!("{network}{}", constants::CONFIG_DIR_SUFFIX)
}

/// Checks that `name` is a single normal path component, so joining it
/// onto a directory cannot leave that directory.
pub(crate) fn validate_name(kind: &str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let plain = !name.contains('/')
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();
    if plain {
        Ok(())
    } else {
        Err(CniDriverError::Config {
            message: format!("invalid {kind} name {name:?}"),
        })
    }
}

/// Creates `dir` and its parents with owner-only access.
pub(crate) fn create_private_dir(dir: &Path) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .mode(constants::DIR_MODE)
        .create(dir)
        .map_err(|e| CniDriverError::io(dir, e))
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let content = serde_json::to_vec_pretty(value).map_err(|e| CniDriverError::Serialization {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), content = %String::from_utf8_lossy(&content), "writing CNI config");

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(constants::CONFIG_FILE_MODE)
        .open(path)
        .map_err(|e| CniDriverError::io(path, e))?;
    file.write_all(&content)
        .map_err(|e| CniDriverError::io(path, e))
}

/// Compares two paths by device and inode, following symlinks.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

/// Removes a file, symlink, or empty directory; a missing entry is fine.
fn remove_entry(path: &Path) -> Result<()> {
    let removed = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    match removed {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(CniDriverError::io(path, e)),
        _ => Ok(()),
    }
}
