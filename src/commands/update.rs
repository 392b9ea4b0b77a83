use anyhow::Result;

use super::Ctx;
use crate::efi;

/// Regenerate, reinstall and re-sign the boot loader.
///
/// Runs unconditionally: the caller (upgrade, or an operator after a
/// manual mount) is responsible for having the boot and EFI directories
/// mounted. Stale NVRAM entries under the configured label are removed
/// before the loader re-registers itself, then the installed binary is
/// signed and buffers are flushed.
pub fn run(ctx: &Ctx) -> Result<()> {
    let config = ctx.config;

    println!("Regenerating {} configuration...", ctx.loader.name());
    ctx.loader.regenerate_config(&config.boot_dir)?;

    println!(
        "Removing EFI boot entries labeled '{}'...",
        config.efi_entry_label
    );
    let removed = efi::remove_by_label(ctx.entries, &config.efi_entry_label)?;
    if removed == 0 {
        println!("No existing entries to remove");
    }

    println!("Installing {}...", ctx.loader.name());
    ctx.loader
        .install(&config.boot_dir, &config.efi_dir, &config.efi_entry_label)?;

    let loader_binary = config.loader_binary();
    println!("Signing {}...", loader_binary.display());
    ctx.runner.run(
        &ctx.sign_helper.to_string_lossy(),
        &[&loader_binary.to_string_lossy()],
    )?;

    println!("Flushing filesystem buffers...");
    ctx.runner.run("sync", &[])?;

    println!("✓ Boot loader updated and signed");

    Ok(())
}
