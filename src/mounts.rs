use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::cmd;

/// Read-only view of mount state. Answers are taken from the live system
/// on every call; nothing is cached, since mount state can change between
/// checks.
pub trait MountQuerier {
    /// Is something currently mounted at this path?
    fn is_mounted(&self, path: &Path) -> Result<bool>;

    /// Does fstab define a mountpoint for this path (mounted or not)?
    fn has_fstab_entry(&self, path: &Path) -> Result<bool>;
}

/// Mutating mount operations. Both rely on the fstab entry whose
/// presence preflight has already verified.
pub trait Mounter {
    fn mount(&self, path: &Path) -> Result<()>;
    fn unmount(&self, path: &Path) -> Result<()>;
}

/// Queries through findmnt, mutations through mount/umount.
pub struct SystemMounts;

impl SystemMounts {
    fn findmnt(&self, extra: &[&str], path: &Path) -> Result<bool> {
        let status = Command::new("findmnt")
            .args(extra)
            .args(["-n", "--mountpoint"])
            .arg(path)
            .stdout(Stdio::null())
            .status()
            .context("Failed to run findmnt")?;
        Ok(status.success())
    }
}

impl MountQuerier for SystemMounts {
    fn is_mounted(&self, path: &Path) -> Result<bool> {
        self.findmnt(&[], path)
    }

    fn has_fstab_entry(&self, path: &Path) -> Result<bool> {
        self.findmnt(&["--fstab"], path)
    }
}

impl Mounter for SystemMounts {
    fn mount(&self, path: &Path) -> Result<()> {
        cmd::run("mount", [path.as_os_str()])
    }

    fn unmount(&self, path: &Path) -> Result<()> {
        cmd::run("umount", [path.as_os_str()])
    }
}
