use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use log::info;

use crate::{
    cmd::CommandRunner,
    config::{GeneralConfig, UserConfig},
    defaults::{Defaults, SUDOERS_RULE},
    error::InstallerError,
    ui,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn append(path: &Path, text: &str) -> Result<(), InstallerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(text.as_bytes())?;
    Ok(())
}

fn write(path: &Path, text: &str) -> Result<(), InstallerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

/// Runs `args` inside the new system with `arch-chroot`.
fn chroot(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
    args: &[&str],
    spin_msg: &str,
    done_msg: &str,
) -> Result<(), InstallerError> {
    let target = defaults.target_arg();
    let mut full = vec![target.as_str()];
    full.extend_from_slice(args);
    runner.run("arch-chroot", &full, spin_msg, done_msg)
}

// ── Base system ───────────────────────────────────────────────────────────────

/// Installs the base packages with `pacstrap`, which streams its own progress.
pub fn pacstrap(runner: &mut dyn CommandRunner, defaults: &Defaults) -> Result<(), InstallerError> {
    let target = defaults.target_arg();
    let mut args = vec![target.as_str()];
    args.extend(defaults.base_packages.iter().map(String::as_str));

    println!();
    runner.run_interactive("pacstrap", &args)?;
    ui::print_success("Base system installed.");
    Ok(())
}

/// Equivalent to: `genfstab -U /mnt >> /mnt/etc/fstab`
pub fn genfstab(runner: &mut dyn CommandRunner, defaults: &Defaults) -> Result<(), InstallerError> {
    fs::create_dir_all(defaults.in_target("etc"))?;

    let pb = ui::spinner("Generating fstab (UUID-based)…");
    let result = runner.append_to_file(
        "genfstab",
        &["-U", &defaults.target_arg()],
        &defaults.in_target("etc/fstab"),
    );

    if result.is_ok() {
        ui::done_spinner(pb, "fstab written.");
    } else {
        pb.finish_and_clear();
    }

    result
}

// ── Identity ──────────────────────────────────────────────────────────────────

pub fn set_hostname(defaults: &Defaults, general: &GeneralConfig) -> Result<(), InstallerError> {
    write(
        &defaults.in_target("etc/hostname"),
        &format!("{}\n", general.hostname),
    )?;
    ui::print_success(&format!("Hostname set to {}.", general.hostname));
    Ok(())
}

pub fn make_hosts(defaults: &Defaults, general: &GeneralConfig) -> Result<(), InstallerError> {
    let host = &general.hostname;
    write(
        &defaults.in_target("etc/hosts"),
        &format!("127.0.0.1\tlocalhost\n::1\tlocalhost\n127.0.1.1\t{host}.localdomain\t{host}\n"),
    )?;
    ui::print_success("/etc/hosts written.");
    Ok(())
}

// ── Users ─────────────────────────────────────────────────────────────────────

/// Creates each user; sudo users join `wheel`.
pub fn add_users(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
    users: &[UserConfig],
) -> Result<(), InstallerError> {
    let target = defaults.target_arg();

    for user in users {
        info!("adding user {} (sudo: {})", user.username, user.sudo);

        let mut useradd = vec![target.as_str(), "useradd", "-m"];
        if user.sudo {
            useradd.extend(["-G", "wheel"]);
        }
        useradd.push(user.username.as_str());
        runner.run(
            "arch-chroot",
            &useradd,
            &format!("Creating user {}…", user.username),
            &format!("{} {} created.", user.role_label(), user.username),
        )?;

        runner.run_with_input(
            "arch-chroot",
            &[&target, "chpasswd"],
            &format!("{}:{}", user.username, user.password),
        )?;
    }

    Ok(())
}

/// Lets members of `wheel` use sudo.
pub fn edit_sudoers(defaults: &Defaults) -> Result<(), InstallerError> {
    append(
        &defaults.in_target("etc/sudoers"),
        &format!("\n{}\n", SUDOERS_RULE),
    )?;
    ui::print_success("wheel group allowed in sudoers.");
    Ok(())
}

pub fn lock_root(runner: &mut dyn CommandRunner, defaults: &Defaults) -> Result<(), InstallerError> {
    chroot(
        runner,
        defaults,
        &["passwd", "-l", "root"],
        "Locking the root account…",
        "Root account locked.",
    )
}

// ── Time & locale ─────────────────────────────────────────────────────────────

pub fn setup_time(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
    general: &GeneralConfig,
) -> Result<(), InstallerError> {
    let zone = format!("/usr/share/zoneinfo/{}", general.timezone);
    let localtime = defaults.in_target("etc/localtime").display().to_string();

    runner.run(
        "ln",
        &["-sf", &zone, &localtime],
        &format!("Linking {}…", zone),
        &format!("Timezone set to {}.", general.timezone),
    )?;
    chroot(
        runner,
        defaults,
        &["hwclock", "--systohc"],
        "Syncing hardware clock…",
        "Hardware clock set.",
    )
}

pub fn locale_gen(runner: &mut dyn CommandRunner, defaults: &Defaults) -> Result<(), InstallerError> {
    append(
        &defaults.in_target("etc/locale.gen"),
        &format!("{}\n", defaults.locale_gen),
    )?;
    chroot(
        runner,
        defaults,
        &["locale-gen"],
        "Generating locale…",
        "Locale generated.",
    )?;
    append(
        &defaults.in_target("etc/locale.conf"),
        &format!("\n{}\n", defaults.locale_conf),
    )
}

// ── Network ───────────────────────────────────────────────────────────────────

pub fn setup_network(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
) -> Result<(), InstallerError> {
    chroot(
        runner,
        defaults,
        &["pacman", "-S", "--noconfirm", "networkmanager"],
        "Installing NetworkManager…",
        "NetworkManager installed.",
    )?;
    chroot(
        runner,
        defaults,
        &["systemctl", "enable", "NetworkManager"],
        "Enabling NetworkManager…",
        "NetworkManager enabled.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    fn defaults_in(dir: &Path) -> Defaults {
        Defaults {
            target: dir.to_path_buf(),
            ..Defaults::default()
        }
    }

    fn general() -> GeneralConfig {
        GeneralConfig {
            timezone: "America/New_York".into(),
            hostname: "archbox".into(),
            users: vec![
                UserConfig {
                    username: "alice".into(),
                    password: "s3cret".into(),
                    sudo: true,
                },
                UserConfig {
                    username: "guest".into(),
                    password: "guest".into(),
                    sudo: false,
                },
            ],
        }
    }

    #[test]
    fn identity_files() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = defaults_in(dir.path());

        set_hostname(&defaults, &general()).unwrap();
        make_hosts(&defaults, &general()).unwrap();

        let etc = dir.path().join("etc");
        assert_eq!(fs::read_to_string(etc.join("hostname")).unwrap(), "archbox\n");
        let hosts = fs::read_to_string(etc.join("hosts")).unwrap();
        assert!(hosts.starts_with("127.0.0.1\tlocalhost\n::1\tlocalhost\n"));
        assert!(hosts.ends_with("127.0.1.1\tarchbox.localdomain\tarchbox\n"));
    }

    #[test]
    fn only_sudo_users_join_wheel() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = defaults_in(dir.path());
        let target = dir.path().display().to_string();
        let mut runner = RecordingRunner::default();

        add_users(&mut runner, &defaults, &general().users).unwrap();

        assert_eq!(
            runner.commands,
            vec![
                format!("arch-chroot {target} useradd -m -G wheel alice"),
                format!("arch-chroot {target} chpasswd"),
                format!("arch-chroot {target} useradd -m guest"),
                format!("arch-chroot {target} chpasswd"),
            ]
        );
        assert_eq!(runner.inputs, vec!["alice:s3cret", "guest:guest"]);
    }

    #[test]
    fn sudoers_rule_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = defaults_in(dir.path());
        let sudoers = dir.path().join("etc/sudoers");
        write(&sudoers, "root ALL=(ALL:ALL) ALL\n").unwrap();

        edit_sudoers(&defaults).unwrap();

        assert_eq!(
            fs::read_to_string(sudoers).unwrap(),
            "root ALL=(ALL:ALL) ALL\n\n%wheel ALL=(ALL:ALL) ALL\n"
        );
    }

    #[test]
    fn timezone_is_linked_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = defaults_in(dir.path());
        let target = dir.path().display().to_string();
        let mut runner = RecordingRunner::default();

        setup_time(&mut runner, &defaults, &general()).unwrap();

        assert_eq!(
            runner.commands[0],
            format!("ln -sf /usr/share/zoneinfo/America/New_York {target}/etc/localtime")
        );
        assert_eq!(runner.commands[1], format!("arch-chroot {target} hwclock --systohc"));
    }

    #[test]
    fn locale_files_and_generation() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = defaults_in(dir.path());
        let mut runner = RecordingRunner::default();

        locale_gen(&mut runner, &defaults).unwrap();

        let etc = dir.path().join("etc");
        assert_eq!(
            fs::read_to_string(etc.join("locale.gen")).unwrap(),
            "en_US.UTF-8 UTF-8\n"
        );
        assert_eq!(
            fs::read_to_string(etc.join("locale.conf")).unwrap(),
            "\nLANG=en_US.UTF-8\n"
        );
        assert!(runner.commands[0].ends_with("locale-gen"));
    }

    #[test]
    fn pacstrap_installs_base_packages_into_target() {
        let mut runner = RecordingRunner::default();
        pacstrap(&mut runner, &Defaults::default()).unwrap();
        assert_eq!(runner.commands, vec!["pacstrap /mnt base linux linux-firmware sudo"]);
    }

    #[test]
    fn fstab_is_appended_under_target() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = defaults_in(dir.path());
        let target = dir.path().display().to_string();
        let mut runner = RecordingRunner::default();

        genfstab(&mut runner, &defaults).unwrap();

        assert_eq!(
            runner.commands,
            vec![format!("genfstab -U {target} >> {target}/etc/fstab")]
        );
        assert!(dir.path().join("etc").is_dir());
    }
}
