pub mod mount;
pub mod unmount;
pub mod update;
pub mod upgrade;

use std::path::Path;

use crate::bootloader::BootLoader;
use crate::cmd::CommandRunner;
use crate::config::Config;
use crate::efi::BootEntryLister;
use crate::mapping::MappingController;
use crate::mounts::{MountQuerier, Mounter};

/// The four CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Mount,
    Unmount,
    UpdateBootLoader,
    Upgrade,
}

impl Command {
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "mount" => Some(Command::Mount),
            "umount" => Some(Command::Unmount),
            "update-grub" => Some(Command::UpdateBootLoader),
            "upgrade" => Some(Command::Upgrade),
            _ => None,
        }
    }
}

/// Everything an operation needs: the immutable configuration plus the
/// collaborators resolved during preflight. Operations only see these
/// seams, never the real system tools directly.
pub struct Ctx<'a> {
    pub config: &'a Config,
    /// Backing device of the boot mapping, resolved from crypttab
    pub device: &'a Path,
    /// Resolved path of the Secure Boot signing helper
    pub sign_helper: &'a Path,
    pub mapping: &'a dyn MappingController,
    pub query: &'a dyn MountQuerier,
    pub mounter: &'a dyn Mounter,
    pub entries: &'a dyn BootEntryLister,
    pub loader: &'a dyn BootLoader,
    pub runner: &'a dyn CommandRunner,
}

impl Command {
    /// Dispatch to the operation. Upgrade composes the other operations
    /// by direct calls, so every step sees identical guard behavior.
    pub fn dispatch(self, ctx: &Ctx) -> anyhow::Result<()> {
        match self {
            Command::Mount => mount::run(ctx),
            Command::Unmount => unmount::run(ctx),
            Command::UpdateBootLoader => update::run(ctx),
            Command::Upgrade => upgrade::run(ctx),
        }
    }
}
