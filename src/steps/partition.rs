use log::info;

use crate::{
    cmd::CommandRunner,
    error::InstallerError,
    layout::{Filesystem, PartitionLayout, PartitionNaming},
    ui,
};

// ── Layout summary ────────────────────────────────────────────────────────────

fn print_layout(device: &str, layout: &PartitionLayout, naming: PartitionNaming) {
    let rows: Vec<_> = layout
        .partitions
        .iter()
        .map(|p| {
            (
                p.role,
                format!("{}  {}MB", naming.path_for(device, p.role), p.size_mb),
            )
        })
        .collect();

    println!();
    ui::print_kv_box("Partition Layout", &rows);
    println!();
}

// ── Partitioning ──────────────────────────────────────────────────────────────

/// Writes a fresh GPT label, creates every partition in `layout`, then
/// formats them, in role order.
pub fn apply(
    runner: &mut dyn CommandRunner,
    device: &str,
    layout: &PartitionLayout,
    naming: PartitionNaming,
) -> Result<(), InstallerError> {
    print_layout(device, layout, naming);
    info!("partitioning {}: {:?}", device, layout.partitions);

    runner.run(
        "parted",
        &[device, "--script", "mklabel", "gpt"],
        &format!("Writing GPT label to {}…", device),
        &format!("{} now has a GPT label.", device),
    )?;

    for part in &layout.partitions {
        let start = format!("{}MB", part.start_mb);
        let end = format!("{}MB", part.end_mb());
        runner.run(
            "parted",
            &[
                device,
                "--script",
                "mkpart",
                "primary",
                part.role.filesystem().parted_name(),
                &start,
                &end,
            ],
            &format!("Creating {} partition ({}MB)…", part.role, part.size_mb),
            &format!("{} partition created ({} → {}).", part.role, start, end),
        )?;
    }

    for part in &layout.partitions {
        let path = naming.path_for(device, part.role);
        format_partition(runner, &path, part.role.filesystem())?;
    }

    Ok(())
}

// ── Formatting ────────────────────────────────────────────────────────────────

fn format_partition(
    runner: &mut dyn CommandRunner,
    path: &str,
    fs: Filesystem,
) -> Result<(), InstallerError> {
    match fs {
        Filesystem::Fat32 => runner.run(
            "mkfs.fat",
            &["-F32", path],
            &format!("Formatting {} as FAT32…", path),
            &format!("{} formatted as FAT32 (boot).", path),
        ),
        Filesystem::Swap => runner.run(
            "mkswap",
            &[path],
            &format!("Initialising swap on {}…", path),
            &format!("{} initialised as swap.", path),
        ),
        Filesystem::Ext4 => runner.run(
            "mkfs.ext4",
            &["-F", path],
            &format!("Formatting {} as ext4…", path),
            &format!("{} formatted as ext4.", path),
        ),
    }
}
