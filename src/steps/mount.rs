use crate::{
    cmd::CommandRunner,
    defaults::Defaults,
    error::InstallerError,
    layout::{PartitionLayout, Role},
};

/// Mounts the new partitions into the installation tree.
///
/// Mount order:
///   1. Root  → /mnt
///   2. Home  → /mnt/home (separate /home only)
///   3. Boot  → /mnt/boot
///   4. Swap  → swapon
pub fn run(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
    device: &str,
    layout: &PartitionLayout,
) -> Result<(), InstallerError> {
    let target = defaults.target_arg();
    let path = |role| defaults.naming.path_for(device, role);

    // 1. Root
    let root = path(Role::Root);
    runner.run(
        "mount",
        &[&root, &target],
        &format!("Mounting {} → {}…", root, target),
        &format!("{} mounted at {}.", root, target),
    )?;

    // 2. Home
    if layout.has_home() {
        mount_under(runner, defaults, &path(Role::Home), "home")?;
    }

    // 3. Boot
    mount_under(runner, defaults, &path(Role::Boot), "boot")?;

    // 4. Swap
    let swap = path(Role::Swap);
    runner.run(
        "swapon",
        &[&swap],
        &format!("Activating swap on {}…", swap),
        &format!("Swap on {} activated.", swap),
    )?;

    Ok(())
}

/// Creates `<target>/<dir>` and mounts `partition` there.
fn mount_under(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
    partition: &str,
    dir: &str,
) -> Result<(), InstallerError> {
    let mount_point = defaults.in_target(dir).display().to_string();

    runner.run(
        "mkdir",
        &["-p", &mount_point],
        &format!("Creating {}…", mount_point),
        &format!("Directory {} created.", mount_point),
    )?;

    runner.run(
        "mount",
        &[partition, &mount_point],
        &format!("Mounting {} → {}…", partition, mount_point),
        &format!("{} mounted at {}.", partition, mount_point),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::{DiskTarget, Planner},
        testing::RecordingRunner,
    };

    fn layout(root_mb: u64) -> PartitionLayout {
        Planner::new(
            DiskTarget {
                device: "/dev/sda".into(),
                total_mb: 65536,
                root_mb,
            },
            Defaults::default().layout,
        )
        .plan()
        .unwrap()
    }

    #[test]
    fn mounts_root_first_and_swap_last() {
        let mut runner = RecordingRunner::default();
        run(&mut runner, &Defaults::default(), "/dev/sda", &layout(20480)).unwrap();

        assert_eq!(
            runner.commands,
            vec![
                "mount /dev/sda3 /mnt",
                "mkdir -p /mnt/home",
                "mount /dev/sda4 /mnt/home",
                "mkdir -p /mnt/boot",
                "mount /dev/sda1 /mnt/boot",
                "swapon /dev/sda2",
            ]
        );
    }

    #[test]
    fn skips_home_without_separate_partition() {
        let mut runner = RecordingRunner::default();
        run(&mut runner, &Defaults::default(), "/dev/sda", &layout(0)).unwrap();
        assert!(runner.position("home").is_none());
        assert_eq!(runner.commands.len(), 4);
    }
}
