use anyhow::Result;

use super::Ctx;
use crate::error::CryptbootError;

/// Unmount both partitions and lock the boot mapping.
///
/// Refuses unless both directories are currently mounted. Unlike the
/// mount guard this blocks on a *missing* mount: unmounting undoes a
/// full mount, so partial state here means something already went wrong
/// and is left for the operator. Teardown order is the exact reverse of
/// mount.
pub fn run(ctx: &Ctx) -> Result<()> {
    let config = ctx.config;

    if !ctx.query.is_mounted(&config.boot_dir)? || !ctx.query.is_mounted(&config.efi_dir)? {
        return Err(CryptbootError::GuardViolation(format!(
            "{} or {} is not mounted, nothing to unmount",
            config.boot_dir.display(),
            config.efi_dir.display()
        ))
        .into());
    }

    println!("Unmounting {}...", config.efi_dir.display());
    ctx.mounter.unmount(&config.efi_dir)?;

    println!("Unmounting {}...", config.boot_dir.display());
    ctx.mounter.unmount(&config.boot_dir)?;

    println!("Locking encrypted partition...");
    ctx.mapping.lock(&config.mapping_name)?;

    println!("✓ Encrypted boot partition unmounted and locked");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;

    #[test]
    fn unmounts_efi_then_boot_then_locks() {
        let world = FakeWorld::new();
        world.boot_mounted.set(true);
        world.efi_mounted.set(true);
        let loader = FakeLoader {
            world: &world,
            needs_reinstall: true,
        };
        let device = device();
        let helper = sign_helper();

        super::run(&world.ctx(&device, &helper, &loader)).unwrap();

        assert_eq!(
            world.calls(),
            vec!["umount /boot/efi", "umount /boot", "lock cryptboot"]
        );
    }

    #[test]
    fn teardown_order_is_reverse_of_mount() {
        let world = FakeWorld::new();
        let loader = FakeLoader {
            world: &world,
            needs_reinstall: true,
        };
        let device = device();
        let helper = sign_helper();
        let ctx = world.ctx(&device, &helper, &loader);

        super::super::mount::run(&ctx).unwrap();
        super::run(&ctx).unwrap();

        let calls = world.calls();
        let mount_targets: Vec<_> = calls
            .iter()
            .filter_map(|c| c.strip_prefix("mount "))
            .collect();
        let mut umount_targets: Vec<_> = calls
            .iter()
            .filter_map(|c| c.strip_prefix("umount "))
            .collect();
        umount_targets.reverse();
        assert_eq!(mount_targets, umount_targets);

        // mapping unlocked before any mount, locked after every unmount
        assert!(calls.first().unwrap().starts_with("unlock"));
        assert!(calls.last().unwrap().starts_with("lock"));
    }

    #[test]
    fn refuses_when_efi_dir_not_mounted() {
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
    fn refuses_when_nothing_mounted() {
        let world = FakeWorld::new();
        let loader = FakeLoader {
            world: &world,
            needs_reinstall: true,
        };
        let device = device();
        let helper = sign_helper();

        assert!(super::run(&world.ctx(&device, &helper, &loader)).is_err());
        assert!(world.calls().is_empty());
    }
}
