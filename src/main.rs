use arch_installer::{
    cmd::SystemRunner,
    defaults::Defaults,
    error::InstallerError,
    host::LiveHost,
    installer,
    prompt::TermPrompter,
    ui,
};
use log::LevelFilter;

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    init_logger();

    if let Err(e) = run() {
        println!();
        ui::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}

/// Warnings only unless `RUST_LOG` says otherwise; the terminal belongs to the wizard.
fn init_logger() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();
}

fn run() -> Result<(), InstallerError> {
    // ── Guard ─────────────────────────────────────────────────────────────────
    check_root()?;

    // ── Welcome ───────────────────────────────────────────────────────────────
    ui::print_banner();
    ui::print_info("This wizard will guide you through a full Arch Linux installation.");
    ui::print_info("Nothing is written to disk until you confirm twice.");

    // ── Configuration + installation ──────────────────────────────────────────
    installer::configure_and_install(
        &mut TermPrompter,
        &LiveHost,
        &Defaults::default(),
        &mut SystemRunner,
    )?;

    println!();
    ui::print_success("Installation complete! You can now reboot into your new system.");
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Checks that the process is running as root (UID 0).
fn check_root() -> Result<(), InstallerError> {
    let uid = std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|s| {
            s.lines()
                .find(|l| l.starts_with("Uid:"))
                .and_then(|l| l.split_whitespace().nth(1))
                .and_then(|v| v.parse::<u32>().ok())
        })
        .unwrap_or(1); // default to non-root if unreadable

    if uid != 0 {
        return Err(InstallerError::NotRoot);
    }

    Ok(())
}
