use anyhow::Result;
use std::env;
use tracing_subscriber::EnvFilter;

use cryptboot::bootloader::BootLoader;
use cryptboot::cmd::SystemRunner;
use cryptboot::commands::{Command, Ctx};
use cryptboot::efi::EfiBootMgr;
use cryptboot::mapping::Cryptsetup;
use cryptboot::mounts::SystemMounts;
use cryptboot::preflight;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let Some(arg) = args.get(1) else {
        print_usage();
        return Ok(());
    };

    if matches!(arg.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let Some(command) = Command::from_arg(arg) else {
        eprintln!("Unknown command: {}", arg);
        print_usage();
        std::process::exit(1);
    };

    // No external tool runs before this point.
    let mounts = SystemMounts;
    let preflight = preflight::run(&mounts)?;

    let loader: Box<dyn BootLoader> = preflight.config.boot_loader.loader();
    let ctx = Ctx {
        config: &preflight.config,
        device: &preflight.device,
        sign_helper: &preflight.sign_helper,
        mapping: &Cryptsetup,
        query: &mounts,
        mounter: &mounts,
        entries: &EfiBootMgr,
        loader: loader.as_ref(),
        runner: &SystemRunner,
    };

    command.dispatch(&ctx)
}

fn print_usage() {
    println!(
        r#"cryptboot - Encrypted boot partition manager with UEFI Secure Boot

Usage:
    cryptboot mount        Unlock and mount the encrypted /boot and the EFI partition
    cryptboot umount       Unmount both partitions and lock the encrypted mapping
    cryptboot update-grub  Regenerate, reinstall and re-sign the boot loader
    cryptboot upgrade      Mount, upgrade system packages, refresh boot loader, unmount
    cryptboot help         Show this help message

Configuration is read from /etc/cryptboot.toml (or cryptboot.toml next to
the binary) when present; built-in defaults cover the usual layout of an
encrypted /boot with the EFI System Partition at /boot/efi.
"#
    );
}
