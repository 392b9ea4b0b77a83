use anyhow::Result;
use std::ffi::OsString;
use std::path::Path;

use super::BootLoader;
use crate::cmd;

/// GRUB implementation
///
/// Regenerates grub.cfg with grub-mkconfig and reinstalls the EFI image
/// with grub-install, which also re-registers the NVRAM entry under the
/// configured label.
pub struct Grub;

impl BootLoader for Grub {
    fn name(&self) -> &str {
        "grub"
    }

    fn regenerate_config(&self, boot_dir: &Path) -> Result<()> {
        let grub_cfg = boot_dir.join("grub/grub.cfg");
        cmd::run(
            "grub-mkconfig",
            [OsString::from("-o"), grub_cfg.into_os_string()],
        )
    }

    fn install(&self, boot_dir: &Path, efi_dir: &Path, label: &str) -> Result<()> {
        let mut boot_directory = OsString::from("--boot-directory=");
        boot_directory.push(boot_dir);
        let mut efi_directory = OsString::from("--efi-directory=");
        efi_directory.push(efi_dir);

        cmd::run(
            "grub-install",
            [
                OsString::from("--target=x86_64-efi"),
                boot_directory,
                efi_directory,
                OsString::from(format!("--bootloader-id={}", label)),
                OsString::from("--recheck"),
            ],
        )
    }

    fn needs_reinstall_after_upgrade(&self) -> bool {
        true
    }
}
