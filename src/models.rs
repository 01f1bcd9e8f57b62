//! Core data types for the kernel module manager.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One loaded kernel module as reported by `lsmod` or `/proc/modules`.
///
/// Fields that could not be parsed from the source line are `None` (or empty
/// for `deps`); a record is never rejected for being malformed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Module name (first column)
    #[serde(rename = "module")]
    pub name: Option<String>,
    /// Memory size in bytes (second column)
    pub size: Option<u64>,
    /// Number of dependents holding a reference (third column)
    #[serde(rename = "depcount")]
    pub usecount: Option<u32>,
    /// Modules that use this one, in listing order
    pub deps: Vec<String>,
}

/// Outcome of one external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandResult {
            returncode: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(returncode: i32, stderr: impl Into<String>) -> Self {
        CommandResult {
            returncode,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Exit status 0 is the only success signal.
    pub fn success(&self) -> bool {
        self.returncode == 0
    }
}

/// Direction of a module state change, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleAction {
    Load,
    Remove,
}

impl fmt::Display for ModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleAction::Load => write!(f, "load"),
            ModuleAction::Remove => write!(f, "remove"),
        }
    }
}
