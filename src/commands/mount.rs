use anyhow::Result;

use super::Ctx;
use crate::error::CryptbootError;

/// Unlock the boot mapping and mount both partitions.
///
/// Refuses if either directory is already mounted: a partially or fully
/// mounted state means a previous mount was not undone, and proceeding
/// would double-unlock the mapping. No rollback is attempted if a later
/// step fails; whatever was unlocked or mounted stays that way.
pub fn run(ctx: &Ctx) -> Result<()> {
    let config = ctx.config;

    if ctx.query.is_mounted(&config.boot_dir)? || ctx.query.is_mounted(&config.efi_dir)? {
        return Err(CryptbootError::GuardViolation(format!(
            "{} or {} is already mounted, unmount first",
            config.boot_dir.display(),
            config.efi_dir.display()
        ))
        .into());
    }

    println!("Unlocking encrypted partition {}...", ctx.device.display());
    ctx.mapping.unlock(ctx.device, &config.mapping_name)?;

    println!("Mounting {}...", config.boot_dir.display());
    ctx.mounter.mount(&config.boot_dir)?;

    println!("Mounting {}...", config.efi_dir.display());
    ctx.mounter.mount(&config.efi_dir)?;

    println!("✓ Encrypted boot partition unlocked and mounted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;

    #[test]
    fn unlocks_then_mounts_boot_then_efi() {
        let world = FakeWorld::new();
        let loader = FakeLoader {
            world: &world,
            needs_reinstall: true,
        };
        let device = device();
        let helper = sign_helper();

        super::run(&world.ctx(&device, &helper, &loader)).unwrap();

        assert_eq!(
            world.calls(),
            vec![
                "unlock /dev/sda2 cryptboot",
                "mount /boot",
                "mount /boot/efi",
            ]
        );
    }

    #[test]
    fn refuses_when_boot_dir_already_mounted() {
        let world = FakeWorld::new();
        world.boot_mounted.set(true);
        let loader = FakeLoader {
            world: &world,
            needs_reinstall: true,
        };
        let device = device();
        let helper = sign_helper();

        assert!(super::run(&world.ctx(&device, &helper, &loader)).is_err());
        assert!(world.calls().is_empty());
    }

    #[test]
    fn refuses_when_only_efi_dir_mounted() {
        let world = FakeWorld::new();
        world.efi_mounted.set(true);
        let loader = FakeLoader {
            world: &world,
            needs_reinstall: true,
        };
        let device = device();
        let helper = sign_helper();

        assert!(super::run(&world.ctx(&device, &helper, &loader)).is_err());
        assert!(world.calls().is_empty());
    }

    #[test]
    fn second_mount_fails_guard_without_second_unlock() {
        let world = FakeWorld::new();
        let loader = FakeLoader {
            world: &world,
            needs_reinstall: true,
        };
        let device = device();
        let helper = sign_helper();

        super::run(&world.ctx(&device, &helper, &loader)).unwrap();
        assert!(super::run(&world.ctx(&device, &helper, &loader)).is_err());

        let unlocks = world
            .calls()
            .iter()
            .filter(|c| c.starts_with("unlock"))
            .count();
        assert_eq!(unlocks, 1);
    }
}
