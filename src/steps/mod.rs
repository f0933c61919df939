pub mod boot;
pub mod mount;
pub mod partition;
pub mod post_install;
pub mod system;
