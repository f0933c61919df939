use log::info;

use crate::{
    cmd::CommandRunner,
    config::{InstallConfig, PartitioningConfig},
    defaults::Defaults,
    error::InstallerError,
    host::HostQuery,
    layout::{DiskTarget, PartitionLayout, Planner},
    prompt::Prompter,
    steps, ui,
    wizard::{Outcome, Wizard},
};

const TOTAL_STEPS: u8 = 9;

/// Runs the wizard and installs whatever it confirms. A declined confirmation
/// is [`InstallerError::Cancelled`] and no command is issued.
pub fn configure_and_install<P, H>(
    prompter: &mut P,
    host: &H,
    defaults: &Defaults,
    runner: &mut dyn CommandRunner,
) -> Result<InstallConfig, InstallerError>
where
    P: Prompter + ?Sized,
    H: HostQuery,
{
    let config = match Wizard::new(prompter, host).run()? {
        Outcome::Install(config) => config,
        Outcome::Aborted => return Err(InstallerError::Cancelled),
    };
    info!("configuration confirmed for {}", config.general.hostname);

    install(&config, defaults, runner, host)?;
    Ok(config)
}

/// Queries the disk size and plans the layout. Fails before anything is
/// written if the requested root partition does not fit.
pub fn plan_layout(
    partitioning: &PartitioningConfig,
    defaults: &Defaults,
    host: &dyn HostQuery,
) -> Result<PartitionLayout, InstallerError> {
    let target = DiskTarget {
        device: partitioning.device.clone(),
        total_mb: host.disk_size_mb(&partitioning.device)?,
        root_mb: partitioning.root_partition_size,
    };
    info!("planning {:?}", target);
    Planner::new(target, defaults.layout).plan()
}

/// Installs the system described by `config`. Any failing step aborts the run;
/// only post-install scripts are allowed to fail.
pub fn install(
    config: &InstallConfig,
    defaults: &Defaults,
    runner: &mut dyn CommandRunner,
    host: &dyn HostQuery,
) -> Result<(), InstallerError> {
    let device = config.partitioning.device.as_str();
    let general = &config.general;

    // ── Step 1: Partition + format ────────────────────────────────────────────
    ui::print_step(1, TOTAL_STEPS, "Disk Partitioning");
    let layout = plan_layout(&config.partitioning, defaults, host)?;
    steps::partition::apply(runner, device, &layout, defaults.naming)?;

    // ── Step 2: Mount ─────────────────────────────────────────────────────────
    ui::print_step(2, TOTAL_STEPS, "Mounting Partitions");
    steps::mount::run(runner, defaults, device, &layout)?;

    // ── Step 3: Base system + fstab ───────────────────────────────────────────
    ui::print_step(3, TOTAL_STEPS, "Base System Installation");
    steps::system::pacstrap(runner, defaults)?;
    steps::system::genfstab(runner, defaults)?;

    // ── Step 4: Hostname + hosts ──────────────────────────────────────────────
    ui::print_step(4, TOTAL_STEPS, "System Identity");
    steps::system::set_hostname(defaults, general)?;
    steps::system::make_hosts(defaults, general)?;

    // ── Step 5: Users ─────────────────────────────────────────────────────────
    ui::print_step(5, TOTAL_STEPS, "User Accounts");
    steps::system::add_users(runner, defaults, &general.users)?;
    steps::system::edit_sudoers(defaults)?;
    steps::system::lock_root(runner, defaults)?;

    // ── Step 6: Time + locale ─────────────────────────────────────────────────
    ui::print_step(6, TOTAL_STEPS, "Time and Locale");
    steps::system::setup_time(runner, defaults, general)?;
    steps::system::locale_gen(runner, defaults)?;

    // ── Step 7: Bootloader ────────────────────────────────────────────────────
    ui::print_step(7, TOTAL_STEPS, "Bootloader");
    steps::boot::setup(runner, defaults, device)?;

    // ── Step 8: Network ───────────────────────────────────────────────────────
    ui::print_step(8, TOTAL_STEPS, "Network");
    steps::system::setup_network(runner, defaults)?;

    // ── Step 9: Post install ──────────────────────────────────────────────────
    ui::print_step(9, TOTAL_STEPS, "Post Installation");
    steps::post_install::run(runner, defaults, &config.post_install)?;

    info!("installation of {} on {} finished", general.hostname, device);
    Ok(())
}
