//! Interactive configuration wizard.
//!
//! ```text
//! CollectGeneral → ReviewGeneral ─no→ CollectGeneral
//!                       │yes
//! CollectPartitioning → ReviewPartitioning ─no→ CollectPartitioning
//!                       │yes
//!                  ConfirmInstall → Install | Aborted
//! ```
//!
//! Each stage is one call to [`Wizard::step`]; a rejected review discards the
//! whole section and goes back to collecting it.

use log::{debug, info};

use crate::{
    config::{
        is_unix_name, GeneralConfig, InstallConfig, PartitioningConfig, PostInstallConfig,
        UserConfig,
    },
    error::InstallerError,
    host::{device_path, HostQuery},
    prompt::{ask, ask_secret, ask_size, ask_yes_no, Prompter},
    select::choose,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CollectGeneral,
    ReviewGeneral,
    CollectPartitioning,
    ReviewPartitioning,
    ConfirmInstall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Both confirmations given; ready for the installer.
    Install(InstallConfig),
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(Stage),
    Done(Outcome),
}

pub struct Wizard<'a, P: ?Sized, H: ?Sized> {
    prompter: &'a mut P,
    host: &'a H,
    timezones: Option<Vec<String>>,
    general: Option<GeneralConfig>,
    partitioning: Option<PartitioningConfig>,
}

impl<'a, P, H> Wizard<'a, P, H>
where
    P: Prompter + ?Sized,
    H: HostQuery + ?Sized,
{
    pub fn new(prompter: &'a mut P, host: &'a H) -> Self {
        Wizard {
            prompter,
            host,
            timezones: None,
            general: None,
            partitioning: None,
        }
    }

    pub fn general(&self) -> Option<&GeneralConfig> {
        self.general.as_ref()
    }

    pub fn partitioning(&self) -> Option<&PartitioningConfig> {
        self.partitioning.as_ref()
    }

    /// Drives the stages from `CollectGeneral` until an outcome is reached.
    pub fn run(mut self) -> Result<Outcome, InstallerError> {
        let mut stage = Stage::CollectGeneral;
        loop {
            match self.step(stage)? {
                Transition::Next(next) => {
                    debug!("wizard: {:?} -> {:?}", stage, next);
                    stage = next;
                }
                Transition::Done(outcome) => return Ok(outcome),
            }
        }
    }

    pub fn step(&mut self, stage: Stage) -> Result<Transition, InstallerError> {
        match stage {
            Stage::CollectGeneral => self.collect_general(),
            Stage::ReviewGeneral => self.review_general(),
            Stage::CollectPartitioning => self.collect_partitioning(),
            Stage::ReviewPartitioning => self.review_partitioning(),
            Stage::ConfirmInstall => self.confirm_install(),
        }
    }

    // ── General ───────────────────────────────────────────────────────────────

    fn collect_general(&mut self) -> Result<Transition, InstallerError> {
        self.general = None;

        self.prompter.section("General");
        let hostname = ask(&mut *self.prompter, "Hostname", |s| {
            is_unix_name(s).then(|| s.to_string())
        })?;

        self.prompter.section("Timezone");
        self.load_timezones()?;
        let zones = self.timezones.as_deref().unwrap_or_default();
        let timezone = choose(&mut *self.prompter, "Timezone", zones)?;

        self.prompter.section("Users");
        let mut users = Vec::new();
        while let Some(user) = self.collect_user()? {
            users.push(user);
        }

        self.general = Some(GeneralConfig {
            timezone,
            hostname,
            users,
        });
        Ok(Transition::Next(Stage::ReviewGeneral))
    }

    /// `None` once an empty username is entered.
    fn collect_user(&mut self) -> Result<Option<UserConfig>, InstallerError> {
        let username = ask(&mut *self.prompter, "Username", |s| {
            (s.is_empty() || is_unix_name(s)).then(|| s.to_string())
        })?;
        if username.is_empty() {
            return Ok(None);
        }

        let password = ask_secret(&mut *self.prompter, "Password", |s| !s.trim().is_empty())?;
        let sudo = ask_yes_no(&mut *self.prompter, &format!("Can {} use sudo? (Y/n)", username))?;
        self.prompter.say("");

        Ok(Some(UserConfig {
            username,
            password,
            sudo,
        }))
    }

    fn review_general(&mut self) -> Result<Transition, InstallerError> {
        let general = self
            .general
            .as_ref()
            .ok_or(InstallerError::Incomplete("ReviewGeneral", "general"))?;

        let mut lines = vec![
            format!("Hostname: {}", general.hostname),
            format!("Timezone: {}", general.timezone),
        ];
        lines.extend(
            general
                .users
                .iter()
                .map(|u| format!("{} {}", u.role_label(), u.username)),
        );

        self.prompter.section("Review General");
        for line in &lines {
            self.prompter.say(line);
        }
        self.prompter.say("");

        if ask_yes_no(&mut *self.prompter, "Is this ok? (Y/n)")? {
            info!("general settings accepted");
            Ok(Transition::Next(Stage::CollectPartitioning))
        } else {
            self.general = None;
            Ok(Transition::Next(Stage::CollectGeneral))
        }
    }

    /// The catalog is fetched once per run.
    fn load_timezones(&mut self) -> Result<(), InstallerError> {
        if self.timezones.is_none() {
            let zones = self.host.list_timezones()?;
            if zones.is_empty() {
                return Err(InstallerError::NoTimezones);
            }
            self.timezones = Some(zones);
        }
        Ok(())
    }

    // ── Partitioning ──────────────────────────────────────────────────────────

    fn collect_partitioning(&mut self) -> Result<Transition, InstallerError> {
        self.partitioning = None;

        self.prompter.section("Partitioning");
        let devices = self.host.list_block_devices()?;
        if devices.is_empty() {
            return Err(InstallerError::NoDevices);
        }
        self.prompter.say("Available drives:");
        let device = device_path(&choose(&mut *self.prompter, "Device", &devices)?);

        let root_partition_size =
            if ask_yes_no(&mut *self.prompter, "Do you want a separate /home partition? (Y/n)")? {
                ask_size(
                    &mut *self.prompter,
                    "Size of the root partition (rest will be given to /home)",
                )?
            } else {
                0
            };

        self.partitioning = Some(PartitioningConfig {
            device,
            root_partition_size,
        });
        Ok(Transition::Next(Stage::ReviewPartitioning))
    }

    fn review_partitioning(&mut self) -> Result<Transition, InstallerError> {
        let partitioning = self
            .partitioning
            .as_ref()
            .ok_or(InstallerError::Incomplete("ReviewPartitioning", "partitioning"))?;

        let mut lines = vec![format!("Device: {}", partitioning.device)];
        if partitioning.has_separate_home() {
            lines.push("Separate /home partition: yes".to_string());
            lines.push(format!(
                "Root partition size: {}MB",
                partitioning.root_partition_size
            ));
        } else {
            lines.push("Separate /home partition: no".to_string());
        }

        self.prompter.section("Review Partitioning");
        for line in &lines {
            self.prompter.say(line);
        }

        if ask_yes_no(&mut *self.prompter, "Is this ok? (Y/n)")? {
            info!("partitioning accepted");
            Ok(Transition::Next(Stage::ConfirmInstall))
        } else {
            self.partitioning = None;
            Ok(Transition::Next(Stage::CollectPartitioning))
        }
    }

    // ── Confirmation ──────────────────────────────────────────────────────────

    fn confirm_install(&mut self) -> Result<Transition, InstallerError> {
        let general = self
            .general
            .clone()
            .ok_or(InstallerError::Incomplete("ConfirmInstall", "general"))?;
        let partitioning = self
            .partitioning
            .clone()
            .ok_or(InstallerError::Incomplete("ConfirmInstall", "partitioning"))?;

        let config = InstallConfig {
            general,
            partitioning,
            post_install: PostInstallConfig::default(),
        };

        self.prompter.section("Confirm");
        for line in config.to_string().lines() {
            self.prompter.say(line);
        }

        let confirmed = ask_yes_no(&mut *self.prompter, "Do you want to install? (Y/n)")?
            && ask_yes_no(
                &mut *self.prompter,
                "This will wipe everything. Are you sure? (Y/n)",
            )?;

        if !confirmed {
            info!("installation declined");
            return Ok(Transition::Done(Outcome::Aborted));
        }

        Ok(Transition::Done(Outcome::Install(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;

    struct FakeHost;

    impl HostQuery for FakeHost {
        fn list_block_devices(&self) -> Result<Vec<String>, InstallerError> {
            Ok(vec!["sda 100G".into(), "nvme0n1 476.9G".into()])
        }

        fn disk_size_mb(&self, _device: &str) -> Result<u64, InstallerError> {
            Ok(102400)
        }

        fn list_timezones(&self) -> Result<Vec<String>, InstallerError> {
            Ok(vec!["Europe/Berlin".into(), "UTC".into()])
        }
    }

    #[test]
    fn collect_general_ends_users_on_empty_name() {
        let mut p = ScriptedPrompter::new(["box1", "2", "alice", "pw", "n", ""]);
        let mut w = Wizard::new(&mut p, &FakeHost);

        let t = w.step(Stage::CollectGeneral).unwrap();
        assert_eq!(t, Transition::Next(Stage::ReviewGeneral));
        assert_eq!(
            w.general(),
            Some(&GeneralConfig {
                timezone: "UTC".into(),
                hostname: "box1".into(),
                users: vec![UserConfig {
                    username: "alice".into(),
                    password: "pw".into(),
                    sudo: false,
                }],
            })
        );
    }

    #[test]
    fn invalid_hostname_and_username_reprompt() {
        let mut p = ScriptedPrompter::new(["", "my-box", "box", "1", "bad name", "bob", " ", "pw", "", ""]);
        let mut w = Wizard::new(&mut p, &FakeHost);
        w.step(Stage::CollectGeneral).unwrap();

        let g = w.general().unwrap().clone();
        assert_eq!(g.hostname, "box");
        assert_eq!(g.users[0].username, "bob");
        assert!(g.users[0].sudo);
        drop(w);
        assert_eq!(p.transcript().iter().filter(|l| *l == "Invalid input").count(), 4);
    }

    #[test]
    fn review_general_lists_roles() {
        let mut p = ScriptedPrompter::new(["box", "1", "root1", "pw", "y", "guest", "pw", "n", "", "y"]);
        let mut w = Wizard::new(&mut p, &FakeHost);
        w.step(Stage::CollectGeneral).unwrap();
        let t = w.step(Stage::ReviewGeneral).unwrap();
        assert_eq!(t, Transition::Next(Stage::CollectPartitioning));
        drop(w);
        assert!(p.saw("Superuser root1"));
        assert!(p.saw("User guest"));
        assert!(p.saw("Timezone: Europe/Berlin"));
    }

    #[test]
    fn rejected_general_review_discards_section() {
        let mut p = ScriptedPrompter::new(["box", "1", "", "n"]);
        let mut w = Wizard::new(&mut p, &FakeHost);
        w.step(Stage::CollectGeneral).unwrap();
        let t = w.step(Stage::ReviewGeneral).unwrap();
        assert_eq!(t, Transition::Next(Stage::CollectGeneral));
        assert!(w.general().is_none());
    }

    #[test]
    fn partitioning_without_home() {
        let mut p = ScriptedPrompter::new(["/nvme", "1", "n"]);
        let mut w = Wizard::new(&mut p, &FakeHost);
        w.step(Stage::CollectPartitioning).unwrap();
        assert_eq!(
            w.partitioning(),
            Some(&PartitioningConfig {
                device: "/dev/nvme0n1".into(),
                root_partition_size: 0,
            })
        );
    }

    #[test]
    fn partitioning_with_home_parses_root_size() {
        let mut p = ScriptedPrompter::new(["1", "", "big", "30G", "y"]);
        let mut w = Wizard::new(&mut p, &FakeHost);
        w.step(Stage::CollectPartitioning).unwrap();
        assert_eq!(w.partitioning().unwrap().root_partition_size, 30720);
        assert_eq!(
            w.step(Stage::ReviewPartitioning).unwrap(),
            Transition::Next(Stage::ConfirmInstall)
        );
        drop(w);
        assert!(p.saw("Separate /home partition: yes"));
        assert!(p.saw("Root partition size: 30720MB"));
    }

    #[test]
    fn rejected_partitioning_review_returns_to_collect() {
        let mut p = ScriptedPrompter::new(["1", "n", "no"]);
        let mut w = Wizard::new(&mut p, &FakeHost);
        w.step(Stage::CollectPartitioning).unwrap();
        assert_eq!(
            w.step(Stage::ReviewPartitioning).unwrap(),
            Transition::Next(Stage::CollectPartitioning)
        );
        assert!(w.partitioning().is_none());
    }

    #[test]
    fn confirm_without_sections_is_an_error() {
        let mut p = ScriptedPrompter::new(["y", "y"]);
        let mut w = Wizard::new(&mut p, &FakeHost);
        assert!(matches!(
            w.step(Stage::ConfirmInstall),
            Err(InstallerError::Incomplete("ConfirmInstall", "general"))
        ));
    }

    #[test]
    fn no_devices_is_fatal() {
        struct Empty;
        impl HostQuery for Empty {
            fn list_block_devices(&self) -> Result<Vec<String>, InstallerError> {
                Ok(vec![])
            }
            fn disk_size_mb(&self, _: &str) -> Result<u64, InstallerError> {
                Ok(0)
            }
            fn list_timezones(&self) -> Result<Vec<String>, InstallerError> {
                Ok(vec![])
            }
        }

        let mut p = ScriptedPrompter::new(["box"]);
        let mut w = Wizard::new(&mut p, &Empty);
        assert!(matches!(w.step(Stage::CollectPartitioning), Err(InstallerError::NoDevices)));
        assert!(matches!(w.step(Stage::CollectGeneral), Err(InstallerError::NoTimezones)));
    }
}
