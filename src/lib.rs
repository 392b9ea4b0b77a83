//! Manage an encrypted /boot partition under UEFI Secure Boot.
//!
//! Orchestrates the external tools that do the real work (cryptsetup,
//! mount, grub, efibootmgr, the signing helper, the package manager)
//! around a small amount of state verification: which device backs the
//! boot mapping, whether the boot and EFI directories are mounted, and
//! which NVRAM entries need replacing.
//!
//! One invocation, one operation, no daemon. The tool keeps no state of
//! its own; everything is re-derived from the live system each run.
//! Concurrent invocations racing on mount state are not coordinated
//! here - serialize runs externally (an advisory lock file, or just one
//! operator) if that can happen. A killed run can leave the mapping
//! unlocked or the directories half mounted; recovery is manual.

pub mod bootloader;
pub mod cmd;
pub mod commands;
pub mod config;
pub mod crypttab;
pub mod efi;
pub mod error;
pub mod mapping;
pub mod mounts;
pub mod paths;
pub mod preflight;
