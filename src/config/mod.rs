//! Configuration module for the kernel module manager.
//!
//! # Module Structure
//!
//! - `loader`: Loads and saves `ManagerConfig` as JSON
//! - `persist`: Parses and edits the boot-time module list
//!
//! `ManagerConfig` carries every path and program name the manager touches,
//! so tests and non-standard hosts can point it elsewhere.

pub mod loader;
pub mod persist;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Debian-style boot module list
pub const ETC_MODULES: &str = "/etc/modules";
/// systemd modules-load.d directory
pub const MODULES_LOAD_D: &str = "/etc/modules-load.d";

/// Paths and programs used by `KmodManager`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// File holding the modules to load at boot
    pub modules_conf: PathBuf,
    /// Root of the installed module trees (`<modules_dir>/<release>/...`)
    pub modules_dir: PathBuf,
    /// Kernel's own loaded-module table, used when `lsmod` is missing
    pub proc_modules: PathBuf,
    /// Kernel release to inspect; `uname -r` when unset
    pub kernel_release: Option<String>,

    pub lsmod_program: String,
    pub load_program: String,
    pub remove_program: String,
    pub uname_program: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            modules_conf: default_modules_conf(Path::new(MODULES_LOAD_D)),
            modules_dir: PathBuf::from("/lib/modules"),
            proc_modules: PathBuf::from("/proc/modules"),
            kernel_release: None,
            lsmod_program: "lsmod".to_string(),
            load_program: "modprobe".to_string(),
            remove_program: "rmmod".to_string(),
            uname_program: "uname".to_string(),
        }
    }
}

impl ManagerConfig {
    /// Default config with the boot module list at `path`.
    pub fn with_modules_conf(path: impl Into<PathBuf>) -> Self {
        ManagerConfig {
            modules_conf: path.into(),
            ..ManagerConfig::default()
        }
    }
}

/// Pick the boot module list for this host.
///
/// systemd hosts read `modules-load.d/*.conf`; everything else uses
/// `/etc/modules`.
pub fn default_modules_conf(modules_load_d: &Path) -> PathBuf {
    if modules_load_d.is_dir() {
        modules_load_d.join("modules.conf")
    } else {
        PathBuf::from(ETC_MODULES)
    }
}
