use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bootloader::BootLoaderKind;
use crate::error::CryptbootError;
use crate::paths;

/// Process-wide settings, built once at preflight and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the encrypted mapping for /boot (first column in crypttab)
    pub mapping_name: String,
    /// Mountpoint of the encrypted boot partition
    pub boot_dir: PathBuf,
    /// Mountpoint of the EFI System Partition
    pub efi_dir: PathBuf,
    /// Which boot loader the update operation manages
    pub boot_loader: BootLoaderKind,
    /// NVRAM label under which the loader is (re-)registered
    pub efi_entry_label: String,
    /// Loader binary to sign, relative to `efi_dir`
    pub efi_loader_path: PathBuf,
    /// Whitespace-split command run by the upgrade operation
    pub package_upgrade_command: String,
    /// Whether upgrade still unmounts after a failed package step
    pub unmount_on_upgrade_failure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mapping_name: "cryptboot".into(),
            boot_dir: "/boot".into(),
            efi_dir: "/boot/efi".into(),
            boot_loader: BootLoaderKind::Grub,
            efi_entry_label: "GRUB".into(),
            efi_loader_path: "EFI/GRUB/grubx64.efi".into(),
            package_upgrade_command: "pacman -Syu --noconfirm".into(),
            unmount_on_upgrade_failure: true,
        }
    }
}

/// Recognized keys of the optional override file. Any subset may be
/// present; missing keys keep their built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverride {
    mapping_name: Option<String>,
    boot_dir: Option<PathBuf>,
    efi_dir: Option<PathBuf>,
    boot_loader: Option<String>,
    efi_entry_label: Option<String>,
    efi_loader_path: Option<PathBuf>,
    package_upgrade_command: Option<String>,
    unmount_on_upgrade_failure: Option<bool>,
}

impl Config {
    /// Load defaults, then apply the first override file found:
    /// the system-wide path wins over the install-relative one.
    pub fn load() -> Result<Self> {
        for path in candidate_paths() {
            if path.is_file() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load defaults overridden by the given TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let overrides: ConfigOverride = toml::from_str(&contents).map_err(|e| {
            CryptbootError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        Self::default().apply(overrides)
    }

    fn apply(mut self, ov: ConfigOverride) -> Result<Self> {
        if let Some(v) = ov.mapping_name {
            self.mapping_name = v;
        }
        if let Some(v) = ov.boot_dir {
            self.boot_dir = v;
        }
        if let Some(v) = ov.efi_dir {
            self.efi_dir = v;
        }
        if let Some(v) = ov.boot_loader {
            self.boot_loader = v.parse()?;
        }
        if let Some(v) = ov.efi_entry_label {
            self.efi_entry_label = v;
        }
        if let Some(v) = ov.efi_loader_path {
            self.efi_loader_path = v;
        }
        if let Some(v) = ov.package_upgrade_command {
            self.package_upgrade_command = v;
        }
        if let Some(v) = ov.unmount_on_upgrade_failure {
            self.unmount_on_upgrade_failure = v;
        }
        Ok(self)
    }

    /// Absolute path of the loader binary handed to the signing helper.
    pub fn loader_binary(&self) -> PathBuf {
        self.efi_dir.join(&self.efi_loader_path)
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(paths::SYSTEM_CONFIG)];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            paths.push(dir.join(paths::LOCAL_CONFIG_NAME));
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.mapping_name, "cryptboot");
        assert_eq!(config.boot_dir, PathBuf::from("/boot"));
        assert_eq!(config.efi_dir, PathBuf::from("/boot/efi"));
        assert_eq!(config.boot_loader, BootLoaderKind::Grub);
        assert_eq!(config.efi_entry_label, "GRUB");
        assert!(config.unmount_on_upgrade_failure);
    }

    #[test]
    fn override_replaces_subset_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mapping_name = \"bootcrypt\"").unwrap();
        writeln!(file, "efi_entry_label = \"Linux\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.mapping_name, "bootcrypt");
        assert_eq!(config.efi_entry_label, "Linux");
        // untouched keys keep defaults
        assert_eq!(config.boot_dir, PathBuf::from("/boot"));
        assert_eq!(config.package_upgrade_command, "pacman -Syu --noconfirm");
    }

    #[test]
    fn override_toggles_upgrade_policy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unmount_on_upgrade_failure = false").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert!(!config.unmount_on_upgrade_failure);
    }

    #[test]
    fn unknown_loader_kind_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "boot_loader = \"lilo\"").unwrap();

        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bootdir = \"/boot\"").unwrap();

        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn loader_binary_joins_efi_dir() {
        let config = Config::default();
        assert_eq!(
            config.loader_binary(),
            PathBuf::from("/boot/efi/EFI/GRUB/grubx64.efi")
        );
    }
}
