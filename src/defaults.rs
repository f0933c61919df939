use std::path::{Path, PathBuf};

use crate::layout::{LayoutConstants, PartitionNaming};

pub const INSTALL_LOCATION: &str = "/mnt";
pub const BASE_PACKAGES: [&str; 4] = ["base", "linux", "linux-firmware", "sudo"];
pub const BOOT_ENTRY_TITLE: &str = "Arch Linux";
pub const LOCALE_GEN: &str = "en_US.UTF-8 UTF-8";
pub const LOCALE_CONF: &str = "LANG=en_US.UTF-8";
pub const SUDOERS_RULE: &str = "%wheel ALL=(ALL:ALL) ALL";

/// Settings the installer does not ask about.
#[derive(Debug, Clone)]
pub struct Defaults {
    /// Where the new system is mounted while it is being installed.
    pub target: PathBuf,
    pub layout: LayoutConstants,
    pub naming: PartitionNaming,
    pub base_packages: Vec<String>,
    pub boot_entry_title: String,
    pub locale_gen: String,
    pub locale_conf: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            target: PathBuf::from(INSTALL_LOCATION),
            layout: LayoutConstants::default(),
            naming: PartitionNaming::default(),
            base_packages: BASE_PACKAGES.iter().map(|p| p.to_string()).collect(),
            boot_entry_title: BOOT_ENTRY_TITLE.to_string(),
            locale_gen: LOCALE_GEN.to_string(),
            locale_conf: LOCALE_CONF.to_string(),
        }
    }
}

impl Defaults {
    /// Path inside the target system, e.g. `etc/hostname` → `/mnt/etc/hostname`.
    pub fn in_target(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.target.join(relative)
    }

    /// The target root as a command argument.
    pub fn target_arg(&self) -> String {
        self.target.display().to_string()
    }
}
