use log::debug;

use crate::{cmd, error::InstallerError};

const BYTES_PER_MB: u64 = 1024 * 1024;

// ── Query seam ────────────────────────────────────────────────────────────────

/// Read-only questions about the machine the installer runs on.
pub trait HostQuery {
    /// One display line per disk, e.g. `sda   100G`.
    fn list_block_devices(&self) -> Result<Vec<String>, InstallerError>;

    fn disk_size_mb(&self, device: &str) -> Result<u64, InstallerError>;

    fn list_timezones(&self) -> Result<Vec<String>, InstallerError>;
}

/// Answers from `lsblk` and `timedatectl`.
#[derive(Debug, Default)]
pub struct LiveHost;

impl HostQuery for LiveHost {
    fn list_block_devices(&self) -> Result<Vec<String>, InstallerError> {
        let output = cmd::run_capture("lsblk", &["-d", "-o", "NAME,SIZE"])?;
        Ok(parse_device_lines(&output))
    }

    fn disk_size_mb(&self, device: &str) -> Result<u64, InstallerError> {
        let output = cmd::run_capture("lsblk", &["-b", "-n", "-d", "-o", "SIZE", device])?;
        let mb = parse_size_bytes(&output)
            .ok_or_else(|| InstallerError::BadOutput("lsblk".into(), output.trim().into()))?;
        debug!("{} is {}MB", device, mb);
        Ok(mb)
    }

    fn list_timezones(&self) -> Result<Vec<String>, InstallerError> {
        let output = cmd::run_capture("timedatectl", &["list-timezones"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Drops the `NAME SIZE` header and blank lines from `lsblk -d` output.
fn parse_device_lines(output: &str) -> Vec<String> {
    output
        .trim()
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// `lsblk -b` size in bytes → whole megabytes.
fn parse_size_bytes(output: &str) -> Option<u64> {
    output.trim().parse::<u64>().ok().map(|b| b / BYTES_PER_MB)
}

/// Device path for a line picked from [`HostQuery::list_block_devices`].
pub fn device_path(display_line: &str) -> String {
    let name = display_line.split_whitespace().next().unwrap_or(display_line);
    format!("/dev/{}", name)
}
