//! Kernel module manager
//!
//! Lists, loads, unloads and persists Linux kernel modules. Every operation
//! shells out through an injected `CommandExecutor` (`lsmod`, `modprobe`,
//! `rmmod`, `uname`) or edits the boot module list through an injected
//! `FileStore`, so the manager itself holds no global state.
//!
//! The crate is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Core data structures (`ModuleRecord`, `CommandResult`)
//! - **system**: Command execution, file storage and input validation
//! - **config**: Manager configuration and the persisted module list
//! - **kernel**: Listing parsers and the `KmodManager`
//! - **log_collector**: Background disk logging for the `log` facade
//!
//! # Example
//!
//! ```no_run
//! use kmod_manager::{KmodManager, ManagerConfig};
//!
//! let kmod = KmodManager::new_production(ManagerConfig::default());
//! if !kmod.is_loaded("loop")? {
//!     kmod.load("loop", true, &["max_loop=64"])?;
//! }
//! # Ok::<(), kmod_manager::ModuleError>(())
//! ```

pub mod error;
pub mod models;

// OS abstraction: command execution and file storage
pub mod system;

pub mod config;
pub mod kernel;

pub mod log_collector;

// Re-export the log crate for macro usage
pub use log;

pub use log_collector::{init_logging, LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use config::persist::PersistedModuleSet;
pub use config::ManagerConfig;
pub use error::{CommandError, ConfigError, ModuleError, Result, StoreError};
pub use kernel::KmodManager;
pub use models::{CommandResult, ModuleAction, ModuleRecord};
pub use system::store::{DiskStore, FileStore};
pub use system::{CommandExecutor, SystemExecutor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
