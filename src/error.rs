//! Unified error type hierarchy for the kernel module manager
//!
//! Provides structured error handling with ModuleError, CommandError,
//! StoreError and ConfigError.

use std::io;
use thiserror::Error;

/// Failures of the external program invocation itself (not its exit code).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Program not found: {0}")]
    NotFound(String),

    #[error("Failed to execute '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },
}

/// Line-oriented file store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Errors returned by kernel module operations.
///
/// `LoadFailed` and `RemoveFailed` carry the stderr of the failed command
/// verbatim; their display strings are part of the public contract.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Error loading module {name}: {stderr}")]
    LoadFailed { name: String, stderr: String },

    #[error("Error removing module {name}: {stderr}")]
    RemoveFailed { name: String, stderr: String },

    /// Module name contains characters outside `[A-Za-z0-9_-]`
    #[error("Invalid module name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration file parsing and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for kernel module operations.
pub type Result<T> = std::result::Result<T, ModuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failed_display() {
        let err = ModuleError::LoadFailed {
            name: "cheese".to_string(),
            stderr: "Module too moldy, refusing to load".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error loading module cheese: Module too moldy, refusing to load"
        );
    }

    #[test]
    fn test_remove_failed_display() {
        let err = ModuleError::RemoveFailed {
            name: "cheese".to_string(),
            stderr: "Cannot find module: it has been eaten".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error removing module cheese: Cannot find module: it has been eaten"
        );
    }

    #[test]
    fn test_command_error_is_transparent() {
        let err: ModuleError = CommandError::NotFound("modprobe".to_string()).into();
        assert_eq!(err.to_string(), "Program not found: modprobe");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::FileNotFound("/etc/kmod.json".to_string());
        assert_eq!(err.to_string(), "Configuration file not found: /etc/kmod.json");
    }
}
