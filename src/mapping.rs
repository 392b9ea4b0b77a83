use anyhow::Result;
use std::ffi::OsStr;
use std::path::Path;

use crate::cmd;

/// Open/close a named encrypted mapping.
pub trait MappingController {
    /// Establish `/dev/mapper/<name>` from the encrypted backing device.
    fn unlock(&self, device: &Path, name: &str) -> Result<()>;

    /// Tear the mapping down.
    fn lock(&self, name: &str) -> Result<()>;
}

/// Drives cryptsetup. The passphrase prompt goes straight to the
/// inherited terminal.
pub struct Cryptsetup;

impl MappingController for Cryptsetup {
    fn unlock(&self, device: &Path, name: &str) -> Result<()> {
        cmd::run(
            "cryptsetup",
            [
                OsStr::new("open"),
                OsStr::new("--type"),
                OsStr::new("luks"),
                device.as_os_str(),
                OsStr::new(name),
            ],
        )
    }

    fn lock(&self, name: &str) -> Result<()> {
        cmd::run("cryptsetup", ["close", name])
    }
}
