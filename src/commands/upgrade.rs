use anyhow::{Context, Result};

use super::{mount, unmount, update, Ctx};
use crate::error::CryptbootError;

/// Full system-upgrade sequence: mount, upgrade packages, refresh the
/// boot loader if its kind requires it, unmount.
///
/// Composes the other operations by direct calls so each step runs under
/// the same guards as its standalone command. If the package step fails
/// and `unmount_on_upgrade_failure` is set (the default), unmount is
/// still attempted so the encrypted partition is not left open; with the
/// policy off the system is left mounted for inspection.
pub fn run(ctx: &Ctx) -> Result<()> {
    let config = ctx.config;

    mount::run(ctx)?;

    println!("Upgrading system packages...");
    if let Err(upgrade_err) = run_package_upgrade(ctx) {
        eprintln!("Package upgrade failed: {:#}", upgrade_err);
        if config.unmount_on_upgrade_failure {
            if let Err(unmount_err) = unmount::run(ctx) {
                tracing::warn!("unmount after failed upgrade also failed: {:#}", unmount_err);
            }
        } else {
            eprintln!(
                "Leaving {} and {} mounted (unmount_on_upgrade_failure = false)",
                config.boot_dir.display(),
                config.efi_dir.display()
            );
        }
        return Err(upgrade_err);
    }

    if ctx.loader.needs_reinstall_after_upgrade() {
        update::run(ctx)?;
    }

    unmount::run(ctx)?;

    println!("✓ System upgrade complete");

    Ok(())
}

/// Split the configured command on whitespace and run it. No shell is
/// involved, so quoting inside the command string is not interpreted.
fn run_package_upgrade(ctx: &Ctx) -> Result<()> {
    let mut words = ctx.config.package_upgrade_command.split_whitespace();
    let program = words.next().ok_or_else(|| {
        CryptbootError::ConfigError("package_upgrade_command is empty".into())
    })?;
    let args: Vec<&str> = words.collect();

    ctx.runner
        .run(program, &args)
        .context("Package upgrade command failed")
}
