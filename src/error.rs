use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command '{0}' failed with exit code {1}")]
    CommandFailed(String, i32),

    #[error("Command '{0}' not found; is it installed?")]
    CommandNotFound(String),

    #[error("Unexpected output from '{0}': {1}")]
    BadOutput(String, String),

    #[error("Installation aborted")]
    Cancelled,

    #[error("This installer must be run as root (sudo)")]
    NotRoot,

    #[error("Disk {device} is too small: {total_mb}MB cannot hold boot and swap ({required_mb}MB)")]
    DiskTooSmall {
        device: String,
        total_mb: u64,
        required_mb: u64,
    },

    #[error("Root partition size is too large for the available space ({root_mb}MB requested, {available_mb}MB left for /home)")]
    RootTooLarge { root_mb: u64, available_mb: i64 },

    #[error("No block devices found")]
    NoDevices,

    #[error("No timezones available")]
    NoTimezones,

    #[error("Input closed before the configuration was complete")]
    InputClosed,

    #[error("Wizard reached {0} without a confirmed {1} section")]
    Incomplete(&'static str, &'static str),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Configuration error: {0}")]
    Json(#[from] serde_json::Error),
}
