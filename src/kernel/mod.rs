//! Kernel Module Management
//!
//! Handles interactions with the running kernel's module state:
//! - Parsing `lsmod`, `/proc/modules` and the installed module tree
//! - Loading, unloading and persisting modules

pub mod manager;
pub mod parser;

pub use manager::KmodManager;
