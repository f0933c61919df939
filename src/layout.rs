//! Partition layout planning.
//!
//! Turns a disk size and an optional root-size request into a contiguous
//! boot / swap / root / [home] layout. Nothing here touches a device; the
//! resulting [`PartitionLayout`] is handed to `steps::partition` to be written.

use std::fmt;

use crate::error::InstallerError;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Fixed partition sizes, in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConstants {
    pub boot_mb: u64,
    pub swap_mb: u64,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        LayoutConstants {
            boot_mb: 512,
            swap_mb: 1024,
        }
    }
}

impl LayoutConstants {
    /// Space taken by the fixed-size partitions.
    pub fn fixed_mb(&self) -> u64 {
        self.boot_mb + self.swap_mb
    }
}

// ── Partition descriptors ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Boot,
    Swap,
    Root,
    Home,
}

impl Role {
    /// 1-based partition number on the disk.
    pub fn index(self) -> u32 {
        match self {
            Role::Boot => 1,
            Role::Swap => 2,
            Role::Root => 3,
            Role::Home => 4,
        }
    }

    pub fn filesystem(self) -> Filesystem {
        match self {
            Role::Boot => Filesystem::Fat32,
            Role::Swap => Filesystem::Swap,
            Role::Root | Role::Home => Filesystem::Ext4,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Boot => "Boot",
            Role::Swap => "Swap",
            Role::Root => "Root",
            Role::Home => "Home",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filesystem {
    Fat32,
    Swap,
    Ext4,
}

impl Filesystem {
    /// File system type as `parted mkpart` expects it.
    pub fn parted_name(self) -> &'static str {
        match self {
            Filesystem::Fat32 => "fat32",
            Filesystem::Swap => "linux-swap",
            Filesystem::Ext4 => "ext4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub role: Role,
    pub start_mb: u64,
    pub size_mb: u64,
}

impl Partition {
    pub fn end_mb(&self) -> u64 {
        self.start_mb + self.size_mb
    }
}

/// Ordered partitions: boot, swap, root and optionally home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionLayout {
    pub partitions: Vec<Partition>,
}

impl PartitionLayout {
    pub fn get(&self, role: Role) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.role == role)
    }

    pub fn has_home(&self) -> bool {
        self.get(Role::Home).is_some()
    }

    pub fn total_mb(&self) -> u64 {
        self.partitions.iter().map(|p| p.size_mb).sum()
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

/// The disk to lay out. `root_mb == 0` means no separate /home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskTarget {
    pub device: String,
    pub total_mb: u64,
    pub root_mb: u64,
}

#[derive(Debug, Clone)]
pub struct Planner {
    target: DiskTarget,
    constants: LayoutConstants,
    /// Space left after boot and swap, minus the root request when a
    /// separate /home is wanted. Negative when the disk is too small;
    /// clamped to the `i64` range.
    remaining_mb: i64,
}

impl Planner {
    pub fn new(target: DiskTarget, constants: LayoutConstants) -> Self {
        let mut remaining = i128::from(target.total_mb) - i128::from(constants.fixed_mb());
        if target.root_mb > 0 {
            remaining -= i128::from(target.root_mb);
        }
        let remaining_mb = remaining.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;

        Planner {
            target,
            constants,
            remaining_mb,
        }
    }

    pub fn target(&self) -> &DiskTarget {
        &self.target
    }

    pub fn has_separate_home(&self) -> bool {
        self.target.root_mb > 0
    }

    pub fn remaining_mb(&self) -> i64 {
        self.remaining_mb
    }

    /// Validates the request and computes the layout.
    ///
    /// The root request is checked against the space left for /home, not
    /// against the whole budget after boot and swap: a 15000MB root on a
    /// 20480MB disk is rejected even though it would fit.
    pub fn plan(&self) -> Result<PartitionLayout, InstallerError> {
        let LayoutConstants { boot_mb, swap_mb } = self.constants;
        let total_mb = self.target.total_mb;

        if total_mb <= self.constants.fixed_mb() {
            return Err(InstallerError::DiskTooSmall {
                device: self.target.device.clone(),
                total_mb,
                required_mb: self.constants.fixed_mb(),
            });
        }

        let root_request = self.target.root_mb;
        if root_request > 0 && i128::from(root_request) >= i128::from(self.remaining_mb) {
            return Err(InstallerError::RootTooLarge {
                root_mb: root_request,
                available_mb: self.remaining_mb,
            });
        }

        // remaining_mb is positive past both checks.
        let remaining = self.remaining_mb as u64;
        let root_mb = if self.has_separate_home() {
            root_request
        } else {
            remaining
        };

        let mut partitions = vec![
            Partition { role: Role::Boot, start_mb: 0, size_mb: boot_mb },
            Partition { role: Role::Swap, start_mb: boot_mb, size_mb: swap_mb },
            Partition { role: Role::Root, start_mb: boot_mb + swap_mb, size_mb: root_mb },
        ];

        if self.has_separate_home() {
            partitions.push(Partition {
                role: Role::Home,
                start_mb: boot_mb + swap_mb + root_mb,
                size_mb: remaining,
            });
        }

        Ok(PartitionLayout { partitions })
    }
}

// ── Device naming ─────────────────────────────────────────────────────────────

/// How partition device paths are derived from the disk path.
///
/// The default is `Kernel`, not the unconditional `p<N>` scheme of `PSuffix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionNaming {
    /// Kernel convention: `p` separator only when the disk name ends in a
    /// digit (`/dev/sda1`, `/dev/nvme0n1p1`, `/dev/mmcblk0p1`).
    #[default]
    Kernel,
    /// Always append `p<N>` (`/dev/loop0p1`, `/dev/sdap1`).
    PSuffix,
}

impl PartitionNaming {
    pub fn partition_path(self, device: &str, index: u32) -> String {
        let needs_p = match self {
            PartitionNaming::Kernel => device.ends_with(|c: char| c.is_ascii_digit()),
            PartitionNaming::PSuffix => true,
        };

        if needs_p {
            format!("{device}p{index}")
        } else {
            format!("{device}{index}")
        }
    }

    pub fn path_for(self, device: &str, role: Role) -> String {
        self.partition_path(device, role.index())
    }
}
