use std::fs;

use crate::{
    cmd::CommandRunner,
    defaults::Defaults,
    error::InstallerError,
    layout::Role,
    ui,
};

/// Installs systemd-boot and writes a single entry booting the root partition.
pub fn setup(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
    device: &str,
) -> Result<(), InstallerError> {
    let target = defaults.target_arg();
    runner.run(
        "arch-chroot",
        &[&target, "bootctl", "install"],
        "Installing systemd-boot…",
        "systemd-boot installed.",
    )?;

    let loader = defaults.in_target("boot/loader");
    fs::create_dir_all(loader.join("entries"))?;
    fs::write(
        loader.join("loader.conf"),
        "default linux\ntimeout 3\neditor no\n",
    )?;

    let root = defaults.naming.path_for(device, Role::Root);
    let output = runner.capture("blkid", &["-s", "PARTUUID", "-o", "value", &root])?;
    let part_uuid = output.trim();
    if part_uuid.is_empty() {
        return Err(InstallerError::BadOutput(
            "blkid".into(),
            format!("no PARTUUID for {}", root),
        ));
    }

    fs::write(
        loader.join("entries/linux.conf"),
        format!(
            "title {}\nlinux /vmlinuz-linux\ninitrd /initramfs-linux.img\noptions root=PARTUUID={} rw\n",
            defaults.boot_entry_title, part_uuid
        ),
    )?;

    ui::print_success("Boot entry written.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    #[test]
    fn entry_points_at_root_partuuid() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = Defaults {
            target: dir.path().to_path_buf(),
            ..Defaults::default()
        };
        let mut runner = RecordingRunner::default().with_output("blkid", "5f1c-03\n");

        setup(&mut runner, &defaults, "/dev/nvme0n1").unwrap();

        assert_eq!(
            runner.commands[1],
            "blkid -s PARTUUID -o value /dev/nvme0n1p3"
        );
        let loader = dir.path().join("boot/loader");
        assert_eq!(
            fs::read_to_string(loader.join("loader.conf")).unwrap(),
            "default linux\ntimeout 3\neditor no\n"
        );
        let entry = fs::read_to_string(loader.join("entries/linux.conf")).unwrap();
        assert!(entry.starts_with("title Arch Linux\n"));
        assert!(entry.ends_with("options root=PARTUUID=5f1c-03 rw\n"));
    }

    #[test]
    fn missing_partuuid_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = Defaults {
            target: dir.path().to_path_buf(),
            ..Defaults::default()
        };
        let mut runner = RecordingRunner::default();

        assert!(matches!(
            setup(&mut runner, &defaults, "/dev/sda"),
            Err(InstallerError::BadOutput(..))
        ));
    }
}
