//! Interactive Arch Linux base installer.
//!
//! [`wizard`] collects a confirmed [`config::InstallConfig`]; [`installer`]
//! turns it into a partitioned, bootable system through the commands in
//! [`steps`].

pub mod cmd;
pub mod config;
pub mod defaults;
pub mod error;
pub mod host;
pub mod installer;
pub mod layout;
pub mod prompt;
pub mod select;
pub mod size;
pub mod steps;
pub mod ui;
pub mod wizard;

#[cfg(test)]
mod testing;
