use std::fmt;

use serde::{de::DeserializeOwned, ser::Error as _, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::InstallerError;

// ── Map contract ──────────────────────────────────────────────────────────────

/// Conversion to and from the nested key/value form the installer exchanges.
pub trait ConfigRecord: Serialize + DeserializeOwned {
    fn to_map(&self) -> Result<Map<String, Value>, InstallerError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(InstallerError::Json(serde_json::Error::custom(format!(
                "expected a map, serialized to {other}"
            )))),
        }
    }

    fn from_map(map: Map<String, Value>) -> Result<Self, InstallerError> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Hostnames and usernames: non-empty, letters and digits only.
pub fn is_unix_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphanumeric)
}

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    /// Stored as typed; hashing happens in `chpasswd`.
    pub password: String,
    pub sudo: bool,
}

impl UserConfig {
    pub fn role_label(&self) -> &'static str {
        if self.sudo {
            "Superuser"
        } else {
            "User"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub timezone: String,
    pub hostname: String,
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitioningConfig {
    pub device: String,
    /// Requested root size in MB; 0 means root and /home share one partition.
    #[serde(default)]
    pub root_partition_size: u64,
}

impl PartitioningConfig {
    pub fn has_separate_home(&self) -> bool {
        self.root_partition_size > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInstallConfig {
    pub packages: Vec<String>,
    pub scripts: Vec<String>,
}

/// Everything the installer needs, as confirmed by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallConfig {
    pub general: GeneralConfig,
    pub partitioning: PartitioningConfig,
    pub post_install: PostInstallConfig,
}

impl ConfigRecord for UserConfig {}
impl ConfigRecord for GeneralConfig {}
impl ConfigRecord for PartitioningConfig {}
impl ConfigRecord for PostInstallConfig {}
impl ConfigRecord for InstallConfig {}

// ── Display ───────────────────────────────────────────────────────────────────

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return writeln!(f, "  {name}: none");
    }
    writeln!(f, "  {name}:")?;
    for item in items {
        writeln!(f, "    {item}")?;
    }
    Ok(())
}

/// Multi-line summary shown before the final confirmation. Passwords are masked.
impl fmt::Display for InstallConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.general;
        writeln!(f, "General")?;
        writeln!(f, "  Hostname: {}", g.hostname)?;
        writeln!(f, "  Timezone: {}", g.timezone)?;
        if g.users.is_empty() {
            writeln!(f, "  Users: none")?;
        }
        for user in &g.users {
            writeln!(
                f,
                "  {} {} (password: {})",
                user.role_label(),
                user.username,
                "*".repeat(user.password.chars().count())
            )?;
        }

        let p = &self.partitioning;
        writeln!(f, "Partitioning")?;
        writeln!(f, "  Device: {}", p.device)?;
        if p.has_separate_home() {
            writeln!(f, "  Root partition size: {}MB", p.root_partition_size)?;
            writeln!(f, "  Separate /home partition: yes")?;
        } else {
            writeln!(f, "  Separate /home partition: no")?;
        }

        writeln!(f, "Post install")?;
        write_list(f, "Packages", &self.post_install.packages)?;
        write_list(f, "Scripts", &self.post_install.scripts)
    }
}
