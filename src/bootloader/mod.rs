mod grub;

pub use grub::Grub;

use anyhow::Result;
use std::path::Path;
use std::str::FromStr;

use crate::error::CryptbootError;

/// Which boot loader the update operation manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootLoaderKind {
    Grub,
}

impl FromStr for BootLoaderKind {
    type Err = CryptbootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grub" => Ok(BootLoaderKind::Grub),
            other => Err(CryptbootError::ConfigError(format!(
                "unknown boot loader kind '{}'",
                other
            ))),
        }
    }
}

impl BootLoaderKind {
    pub fn loader(&self) -> Box<dyn BootLoader> {
        match self {
            BootLoaderKind::Grub => Box::new(Grub),
        }
    }
}

/// Trait for boot loader implementations (GRUB today; systemd-boot etc.
/// slot in as further kinds without changing the orchestrator).
pub trait BootLoader {
    /// Name of the loader kind (e.g. "grub")
    fn name(&self) -> &str;

    /// Regenerate the loader configuration under the boot directory
    fn regenerate_config(&self, boot_dir: &Path) -> Result<()>;

    /// Reinstall the loader into the EFI System Partition under the
    /// given NVRAM entry label
    fn install(&self, boot_dir: &Path, efi_dir: &Path, label: &str) -> Result<()>;

    /// Whether a package upgrade requires reinstalling and re-signing
    /// the loader afterwards
    fn needs_reinstall_after_upgrade(&self) -> bool;
}
