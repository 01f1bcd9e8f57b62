//! System module: security-validated command execution, input validation

pub mod store;

use crate::error::{CommandError, ModuleError};
use crate::models::CommandResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::ErrorKind;
use std::process::Command;

static MODULE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_\-]+$").expect("Invalid module name regex")
});

/// Logging macro for convenient access
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::info!("{}", msg);
    }}
}

/// Runs external programs on behalf of the module manager.
///
/// Arguments are always passed as separate argv entries; implementations must
/// never hand them to a shell.
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` and capture exit code, stdout and stderr.
    ///
    /// A non-zero exit code is NOT an error at this level; `Err` means the
    /// program could not be started at all.
    fn run_all(&self, program: &str, args: &[&str]) -> Result<CommandResult, CommandError>;

    /// Run `program` and return only its stdout.
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        self.run_all(program, args).map(|result| result.stdout)
    }
}

/// Default production implementation of CommandExecutor
///
/// Wraps `std::process::Command`, capturing output instead of inheriting it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        SystemExecutor
    }
}

impl CommandExecutor for SystemExecutor {
    fn run_all(&self, program: &str, args: &[&str]) -> Result<CommandResult, CommandError> {
        log::debug!("[System] exec: {} {}", program, args.join(" "));

        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CommandError::NotFound(program.to_string())
            } else {
                CommandError::SpawnFailed {
                    program: program.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        if !stderr.is_empty() {
            log::debug!("[System] [{}] stderr: {}", program, stderr);
        }

        // Killed by a signal: no exit code, report as generic failure
        let returncode = output.status.code().unwrap_or(-1);

        Ok(CommandResult {
            returncode,
            stdout,
            stderr,
        })
    }
}

/// Input Validation Contract
///
/// Module names reach modprobe/rmmod as plain argv entries, but anything
/// outside `[A-Za-z0-9_-]` is still rejected so option-like or path-like
/// names never get that far.
pub fn validate_module_name(name: &str) -> Result<(), ModuleError> {
    if name.starts_with('-') || !MODULE_NAME_REGEX.is_match(name) {
        return Err(ModuleError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_module_name_accepts_kernel_names() {
        assert!(validate_module_name("kvm").is_ok());
        assert!(validate_module_name("kvm_intel").is_ok());
        assert!(validate_module_name("snd-hda-intel").is_ok());
        assert!(validate_module_name("i915").is_ok());
    }

    #[test]
    fn test_validate_module_name_rejects_shell_chars() {
        for bad in ["", "lp; reboot", "../evil", "a b", "$(id)", "-r", "lp\n"] {
            assert!(
                matches!(validate_module_name(bad), Err(ModuleError::InvalidName(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_system_executor_missing_program() {
        let result = SystemExecutor::new().run_all("kmod-manager-no-such-program", &[]);
        assert_eq!(
            result,
            Err(CommandError::NotFound("kmod-manager-no-such-program".to_string()))
        );
    }

    #[test]
    fn test_system_executor_captures_exit_code() {
        let result = SystemExecutor::new().run_all("sh", &["-c", "echo out; echo err >&2; exit 3"]);
        let result = result.unwrap();
        assert_eq!(result.returncode, 3);
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err");
        assert!(!result.success());
    }

    #[test]
    fn test_run_returns_stdout() {
        let stdout = SystemExecutor::new().run("echo", &["lp"]).unwrap();
        assert_eq!(stdout.trim(), "lp");
    }
}
