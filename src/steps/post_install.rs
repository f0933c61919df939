use std::fs;

use log::{info, warn};

use crate::{
    cmd::CommandRunner, config::PostInstallConfig, defaults::Defaults, error::InstallerError, ui,
};

/// Installs extra packages, then runs each script. A failing script is
/// reported and skipped; package installation failures are fatal.
pub fn run(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
    post: &PostInstallConfig,
) -> Result<(), InstallerError> {
    let target = defaults.target_arg();

    if !post.packages.is_empty() {
        let mut args = vec![target.as_str(), "pacman", "-S", "--noconfirm"];
        args.extend(post.packages.iter().map(String::as_str));
        runner.run_interactive("arch-chroot", &args)?;
        ui::print_success(&format!("Installed {} extra package(s).", post.packages.len()));
    }

    if post.scripts.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(defaults.in_target("tmp"))?;
    let mut failed = 0;
    for url in &post.scripts {
        if let Err(e) = run_script(runner, defaults, url) {
            warn!("post-install script {} failed: {}", url, e);
            ui::print_warning(&format!("Error downloading/running script {}: {}", url, e));
            failed += 1;
        }
    }
    info!("{} of {} post-install scripts succeeded", post.scripts.len() - failed, post.scripts.len());

    Ok(())
}

/// Last path segment of the URL, used as the file name under `/tmp`.
fn script_name(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("post-install.sh")
}

fn run_script(
    runner: &mut dyn CommandRunner,
    defaults: &Defaults,
    url: &str,
) -> Result<(), InstallerError> {
    let name = script_name(url);
    let host_path = defaults.in_target("tmp").join(name).display().to_string();
    let chroot_path = format!("/tmp/{}", name);

    runner.run(
        "curl",
        &["-fsSL", "-o", &host_path, url],
        &format!("Downloading {}…", url),
        &format!("{} downloaded.", name),
    )?;
    runner.run(
        "chmod",
        &["+x", &host_path],
        &format!("Marking {} executable…", name),
        &format!("{} is executable.", name),
    )?;
    runner.run_interactive("arch-chroot", &[&defaults.target_arg(), &chroot_path])
}
