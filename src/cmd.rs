use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
    process::{Command, ExitStatus, Output, Stdio},
};

use dialoguer::Confirm;
use log::{debug, info};

use crate::{error::InstallerError, ui};

// ── Runner seam ───────────────────────────────────────────────────────────────

/// Every external command the installer issues goes through this trait.
pub trait CommandRunner {
    /// Silent command behind a spinner. `done_msg` is printed on success.
    fn run(
        &mut self,
        program: &str,
        args: &[&str],
        spin_msg: &str,
        done_msg: &str,
    ) -> Result<(), InstallerError>;

    /// Command that streams its own output to the terminal.
    fn run_interactive(&mut self, program: &str, args: &[&str]) -> Result<(), InstallerError>;

    /// Command fed `input` on stdin.
    fn run_with_input(
        &mut self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<(), InstallerError>;

    fn capture(&mut self, program: &str, args: &[&str]) -> Result<String, InstallerError>;

    /// Command whose stdout is appended to `file_path`.
    fn append_to_file(
        &mut self,
        program: &str,
        args: &[&str],
        file_path: &Path,
    ) -> Result<(), InstallerError>;
}

/// Runs commands on the live system.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &mut self,
        program: &str,
        args: &[&str],
        spin_msg: &str,
        done_msg: &str,
    ) -> Result<(), InstallerError> {
        run_with_spinner(program, args, spin_msg, done_msg)
    }

    fn run_interactive(&mut self, program: &str, args: &[&str]) -> Result<(), InstallerError> {
        run_interactive(program, args)
    }

    fn run_with_input(
        &mut self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<(), InstallerError> {
        run_with_input(program, args, input)
    }

    fn capture(&mut self, program: &str, args: &[&str]) -> Result<String, InstallerError> {
        run_capture(program, args)
    }

    fn append_to_file(
        &mut self,
        program: &str,
        args: &[&str],
        file_path: &Path,
    ) -> Result<(), InstallerError> {
        run_append_to_file(program, args, file_path)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn spawn_error(program: &str, err: io::Error) -> InstallerError {
    match err.kind() {
        io::ErrorKind::NotFound => InstallerError::CommandNotFound(program.to_string()),
        _ => InstallerError::Io(err),
    }
}

fn failed(program: &str, status: ExitStatus) -> InstallerError {
    InstallerError::CommandFailed(program.to_string(), status.code().unwrap_or(-1))
}

/// Replays what a silent command printed, so a failure is not a mystery.
fn dump_output(output: &Output) {
    for stream in [&output.stdout, &output.stderr] {
        let text = String::from_utf8_lossy(stream);
        let text = text.trim();
        if !text.is_empty() {
            eprintln!("{}", text);
        }
    }
}

fn is_on_path(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Maps a binary name to its Arch package name.
fn package_for(program: &str) -> &str {
    match program {
        "parted" => "parted",
        "mkfs.fat" | "mkfs.vfat" | "fsck.fat" | "fatlabel" => "dosfstools",
        "mkfs.ext4" | "mkfs.ext3" | "mkfs.ext2" | "e2fsck" | "resize2fs" | "tune2fs" => {
            "e2fsprogs"
        }
        "mkswap" | "swapon" | "swapoff" | "mount" | "umount" | "lsblk" | "blkid"
        | "findmnt" => "util-linux",
        "pacstrap" | "genfstab" | "arch-chroot" => "arch-install-scripts",
        "bootctl" | "timedatectl" => "systemd",
        "curl" => "curl",
        other => other,
    }
}

/// Retries `attempt` once after offering to install the missing program.
fn with_install_offer<T>(
    program: &str,
    attempt: impl Fn() -> Result<T, InstallerError>,
) -> Result<T, InstallerError> {
    debug!("exec {}", program);
    match attempt() {
        Err(InstallerError::CommandNotFound(_)) => {
            offer_install(program)?;
            attempt()
        }
        other => other,
    }
}

/// Asks to install the package providing `program`. `Ok` only once the
/// binary resolves on `PATH`.
fn offer_install(program: &str) -> Result<(), InstallerError> {
    let pkg = package_for(program);
    let missing = || InstallerError::CommandNotFound(program.to_string());

    ui::print_warning(&format!("'{}' is not installed on this live system.", program));
    let install = Confirm::new()
        .with_prompt(format!("Install package '{}' with pacman now?", pkg))
        .default(true)
        .interact()?;
    if !install {
        return Err(missing());
    }

    info!("installing {} for {}", pkg, program);
    let status = Command::new("pacman")
        .args(["-Sy", "--noconfirm", pkg])
        .status()
        .map_err(|e| spawn_error("pacman", e))?;
    if !status.success() {
        return Err(failed("pacman", status));
    }

    if is_on_path(program) {
        Ok(())
    } else {
        ui::print_error(&format!("'{}' is still missing after installing '{}'.", program, pkg));
        Err(missing())
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Inherits the terminal; for commands that stream their own progress (`pacstrap`).
pub fn run_interactive(program: &str, args: &[&str]) -> Result<(), InstallerError> {
    with_install_offer(program, || {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| spawn_error(program, e))?;

        if !status.success() {
            return Err(failed(program, status));
        }
        Ok(())
    })
}

/// Captures all output behind a spinner. The output is only shown on failure.
pub fn run_with_spinner(
    program: &str,
    args: &[&str],
    spin_msg: &str,
    done_msg: &str,
) -> Result<(), InstallerError> {
    with_install_offer(program, || {
        let pb = ui::spinner(spin_msg);
        let result = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| spawn_error(program, e));
        pb.finish_and_clear();

        match result {
            Err(e) => Err(e),
            Ok(output) if !output.status.success() => {
                dump_output(&output);
                Err(failed(program, output.status))
            }
            Ok(_) => {
                ui::print_success(done_msg);
                Ok(())
            }
        }
    })
}

/// Run a command with `input` written to its stdin (e.g. `chpasswd`).
pub fn run_with_input(program: &str, args: &[&str], input: &str) -> Result<(), InstallerError> {
    with_install_offer(program, || {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        // stdin is dropped at the end of this block so the child sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        };

        // Reap the child even when it stopped reading early.
        let output = child.wait_with_output()?;
        if !output.status.success() {
            dump_output(&output);
            return Err(failed(program, output.status));
        }
        written?;
        Ok(())
    })
}

/// Stdout as a lossy UTF-8 string; stderr goes to the terminal.
pub fn run_capture(program: &str, args: &[&str]) -> Result<String, InstallerError> {
    with_install_offer(program, || {
        let output = Command::new(program)
            .args(args)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| spawn_error(program, e))?;

        if !output.status.success() {
            return Err(failed(program, output.status));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    })
}

/// `program args >> file_path`
pub fn run_append_to_file(
    program: &str,
    args: &[&str],
    file_path: &Path,
) -> Result<(), InstallerError> {
    with_install_offer(program, || {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(file_path)?;

        let status = Command::new(program)
            .args(args)
            .stdout(file)
            .stderr(Stdio::piped())
            .status()
            .map_err(|e| spawn_error(program, e))?;

        if !status.success() {
            return Err(failed(program, status));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_install_tools_to_packages() {
        assert_eq!(package_for("pacstrap"), "arch-install-scripts");
        assert_eq!(package_for("mkfs.fat"), "dosfstools");
        assert_eq!(package_for("swapon"), "util-linux");
        assert_eq!(package_for("htop"), "htop");
    }

    #[test]
    fn capture_reads_stdout() {
        let out = run_capture("echo", &["hello"]).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn failing_command_reports_exit_code() {
        match run_capture("false", &[]) {
            Err(InstallerError::CommandFailed(p, code)) => {
                assert_eq!(p, "false");
                assert_eq!(code, 1);
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn stdin_is_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let script = format!("cat > {}", out.display());
        run_with_input("sh", &["-c", &script], "alice:secret").unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "alice:secret");
    }

    #[test]
    fn child_that_ignores_stdin_is_still_reaped() {
        let input = "x".repeat(1 << 20);
        match run_with_input("sh", &["-c", "exit 3"], &input) {
            Err(InstallerError::CommandFailed(p, code)) => {
                assert_eq!(p, "sh");
                assert_eq!(code, 3);
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn appends_stdout_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fstab");
        std::fs::write(&file, "# header\n").unwrap();
        run_append_to_file("echo", &["UUID=abc / ext4"], &file).unwrap();
        assert_eq!(
            std::fs::read_to_string(file).unwrap(),
            "# header\nUUID=abc / ext4\n"
        );
    }
}
