use std::{fmt::Display, time::Duration};

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

const TITLE: &str = "ARCH LINUX INSTALLER";
const RULE_MAX: usize = 52;
const BOX_INNER: usize = 40;
const SPINNER_TICKS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn rule() -> String {
    let width = Term::stdout().size().1.max(60) as usize;
    "─".repeat(width.min(RULE_MAX))
}

// ── Screens ───────────────────────────────────────────────────────────────────

pub fn print_banner() {
    // A terminal that cannot clear just scrolls.
    let _ = Term::stdout().clear_screen();

    println!();
    println!("   {}", style(TITLE).cyan().bold());
    println!(
        "   {}",
        style("boot · swap · root · home  ·  systemd-boot").dim().italic()
    );
    println!();
    println!("{}", style(rule()).dim());
    println!();
}

/// Clears the screen and shows the wizard section currently being filled in.
pub fn print_section(title: &str) {
    // Failing to clear only leaves the previous section visible.
    let _ = Term::stdout().clear_screen();
    println!("{}", style(TITLE).cyan().bold());
    println!("{}", style(format!("[{}]", title)).white().bold());
    println!();
}

/// Numbered header for one installer step, e.g. ` 3/9   Base System Installation`.
pub fn print_step(step: u8, total: u8, title: &str) {
    println!();
    println!(
        "{}  {}",
        style(format!(" {}/{} ", step, total)).black().on_cyan().bold(),
        style(title).white().bold()
    );
    println!("{}", style(rule()).dim());
}

// ── Status lines ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Info,
    Warning,
    Error,
}

impl Status {
    fn symbol(self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Info => "→",
            Status::Warning => "⚠",
            Status::Error => "✗",
        }
    }

    fn colour(self) -> Style {
        match self {
            Status::Success => Style::new().green(),
            Status::Info => Style::new().blue(),
            Status::Warning => Style::new().yellow(),
            Status::Error => Style::new().red(),
        }
    }

    fn line(self, msg: &str) -> String {
        let colour = self.colour();
        let text = if self == Status::Info {
            msg.to_string()
        } else {
            colour.apply_to(msg).to_string()
        };
        format!("  {}  {}", colour.bold().apply_to(self.symbol()), text)
    }
}

pub fn print_success(msg: &str) {
    println!("{}", Status::Success.line(msg));
}

pub fn print_info(msg: &str) {
    println!("{}", Status::Info.line(msg));
}

/// Non-fatal notice, e.g. a skipped post-install script.
pub fn print_warning(msg: &str) {
    println!("{}", Status::Warning.line(msg));
}

/// Written to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{}", Status::Error.line(msg));
}

// ── Key/value box ─────────────────────────────────────────────────────────────

/// Unstyled lines of a bordered key/value box.
///
/// ```text
/// ┌─ Partition Layout ─────────────────────┐
/// │  Boot         /dev/sda1  512MB         │
/// │  Swap         /dev/sda2  1024MB        │
/// └────────────────────────────────────────┘
/// ```
fn kv_box_lines<K: Display, V: Display>(title: &str, rows: &[(K, V)]) -> Vec<String> {
    let dashes = "─".repeat(BOX_INNER.saturating_sub(title.chars().count() + 3));
    let mut lines = vec![format!("┌─ {} {}┐", title, dashes)];

    for (key, val) in rows {
        let body = format!("  {:<13}{}", key.to_string(), val);
        let pad = BOX_INNER.saturating_sub(body.chars().count());
        lines.push(format!("│{}{}│", body, " ".repeat(pad)));
    }

    lines.push(format!("└{}┘", "─".repeat(BOX_INNER)));
    lines
}

pub fn print_kv_box<K: Display, V: Display>(title: &str, rows: &[(K, V)]) {
    let border = Style::new().dim();
    for line in kv_box_lines(title, rows) {
        println!("  {}", border.apply_to(line));
    }
}

// ── Spinner ───────────────────────────────────────────────────────────────────

/// Running braille spinner; finish it with `finish_and_clear` or [`done_spinner`].
pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("  {spinner:.cyan.bold}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&SPINNER_TICKS);
    pb.set_style(style);
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn done_spinner(pb: ProgressBar, msg: &str) {
    pb.finish_and_clear();
    print_success(msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_lines_share_one_width() {
        let lines = kv_box_lines("Partition Layout", &[("Boot", "/dev/sda1  512MB"), ("Root", "/dev/sda3  10240MB")]);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("┌─ Partition Layout "));
        assert!(lines[1].starts_with("│  Boot         /dev/sda1"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == BOX_INNER + 2), "{widths:?}");
    }

    #[test]
    fn status_lines_carry_their_symbol() {
        assert!(Status::Success.line("done").contains('✓'));
        assert!(Status::Error.line("boom").contains("boom"));
    }
}
