use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::crypttab;
use crate::error::CryptbootError;
use crate::mounts::MountQuerier;
use crate::paths;

/// Everything preflight establishes before any command may run.
pub struct Preflight {
    pub config: Config,
    /// Backing device of the boot mapping
    pub device: PathBuf,
    /// Resolved signing helper path
    pub sign_helper: PathBuf,
}

/// Environment checks run once per invocation, before dispatch.
///
/// Order: privilege, configuration, signing-helper resolution, crypttab
/// resolution, fstab definitions for both mountpoints. Any failure
/// aborts with exit code 1 before the requested command starts.
pub fn run(query: &dyn MountQuerier) -> Result<Preflight> {
    if !nix::unistd::Uid::effective().is_root() {
        return Err(CryptbootError::PermissionDenied.into());
    }

    let config = Config::load()?;
    let sign_helper = resolve_sign_helper();
    let device = verify_environment(&config, query, Path::new(paths::CRYPTTAB))?;

    Ok(Preflight {
        config,
        device,
        sign_helper,
    })
}

/// Resolve the mapping device and confirm both directories have fstab
/// definitions (mounted or not - the mount command relies on them).
pub fn verify_environment(
    config: &Config,
    query: &dyn MountQuerier,
    crypttab_path: &Path,
) -> Result<PathBuf> {
    let device = crypttab::resolve_file(&config.mapping_name, crypttab_path)?;

    for dir in [&config.boot_dir, &config.efi_dir] {
        if !query.has_fstab_entry(dir)? {
            return Err(CryptbootError::ConfigError(format!(
                "no fstab mountpoint defined for {}",
                dir.display()
            ))
            .into());
        }
    }

    Ok(PathBuf::from(device))
}

/// Look for the signing helper on $PATH, falling back to a sibling of
/// this executable (the helper ships alongside the tool).
fn resolve_sign_helper() -> PathBuf {
    which::which(paths::SIGN_HELPER).unwrap_or_else(|_| {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(paths::SIGN_HELPER)))
            .unwrap_or_else(|| PathBuf::from(paths::SIGN_HELPER))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::FakeWorld;
    use std::io::Write;

    fn crypttab_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn resolves_device_when_everything_defined() {
        let world = FakeWorld::new();
        let table = crypttab_file("cryptboot /dev/sda2 none luks\n");

        let device =
            verify_environment(&world.config, &world, table.path()).unwrap();
        assert_eq!(device, PathBuf::from("/dev/sda2"));
    }

    #[test]
    fn missing_mapping_is_fatal() {
        let world = FakeWorld::new();
        let table = crypttab_file("cryptroot /dev/sda2 none luks\n");

        assert!(verify_environment(&world.config, &world, table.path()).is_err());
    }

    #[test]
    fn undefined_boot_mountpoint_is_fatal() {
        let world = FakeWorld::new();
        world.fstab_has_boot.set(false);
        let table = crypttab_file("cryptboot /dev/sda2 none luks\n");

        assert!(verify_environment(&world.config, &world, table.path()).is_err());
    }

    #[test]
    fn undefined_efi_mountpoint_is_fatal() {
        let world = FakeWorld::new();
        world.fstab_has_efi.set(false);
        let table = crypttab_file("cryptboot /dev/sda2 none luks\n");

        assert!(verify_environment(&world.config, &world, table.path()).is_err());
    }

    #[test]
    fn mountpoints_need_not_be_mounted() {
        let world = FakeWorld::new();
        world.boot_mounted.set(false);
        world.efi_mounted.set(false);
        let table = crypttab_file("cryptboot /dev/sda2 none luks\n");

        assert!(verify_environment(&world.config, &world, table.path()).is_ok());
    }
}
