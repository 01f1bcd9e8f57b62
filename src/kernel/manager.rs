//! Kernel Module Manager: load, unload and persist kernel modules
//!
//! This module handles:
//! - Listing modules the running kernel could load
//! - Listing and parsing currently loaded modules
//! - Loading/unloading modules through modprobe/rmmod
//! - Maintaining the boot-time module list
//!
//! Commands go through an injected `CommandExecutor` and the boot list through
//! an injected `FileStore`, so nothing here touches global state.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::persist::PersistedModuleSet;
use crate::config::ManagerConfig;
use crate::error::{CommandError, ModuleError, Result};
use crate::kernel::parser;
use crate::log_info;
use crate::models::{ModuleAction, ModuleRecord};
use crate::system::store::{DiskStore, FileStore};
use crate::system::{validate_module_name, CommandExecutor, SystemExecutor};

/// Manages kernel modules on the local host
pub struct KmodManager {
    config: ManagerConfig,
    executor: Arc<dyn CommandExecutor>,
    store: Arc<dyn FileStore>,
}

impl KmodManager {
    pub fn new(
        config: ManagerConfig,
        executor: Arc<dyn CommandExecutor>,
        store: Arc<dyn FileStore>,
    ) -> Self {
        KmodManager {
            config,
            executor,
            store,
        }
    }

    /// Manager wired to the real system (`std::process`, local disk).
    pub fn new_production(config: ManagerConfig) -> Self {
        Self::new(config, Arc::new(SystemExecutor::new()), Arc::new(DiskStore::new()))
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Every module the running kernel could load, sorted and deduplicated.
    ///
    /// Combines `modules.builtin` with every `*.ko*` file under
    /// `<modules_dir>/<release>`. Both are read through the `FileStore`.
    pub fn available(&self) -> Result<Vec<String>> {
        let release = self.kernel_release()?;
        let mod_dir = self.config.modules_dir.join(&release);
        let mut modules = BTreeSet::new();

        let builtin = self.store.read_lines(&mod_dir.join("modules.builtin"))?;
        modules.extend(
            builtin
                .iter()
                .filter_map(|line| parser::module_name_from_builtin(line)),
        );

        modules.extend(
            self.store
                .list_files(&mod_dir)?
                .iter()
                .filter_map(|path| path.file_name()?.to_str())
                .filter_map(parser::module_name_from_file),
        );

        log::debug!("[Kmod] {} modules available for {}", modules.len(), release);
        Ok(modules.into_iter().collect())
    }

    /// Whether `name` could be loaded. `-` and `_` are interchangeable.
    pub fn check_available(&self, name: &str) -> Result<bool> {
        let wanted = parser::normalize_module_name(name);
        Ok(self.available()?.iter().any(|m| *m == wanted))
    }

    /// Currently loaded modules, one record per `lsmod` row.
    ///
    /// Falls back to reading `/proc/modules` when the listing program is not
    /// installed.
    pub fn lsmod(&self) -> Result<Vec<ModuleRecord>> {
        match self.executor.run(&self.config.lsmod_program, &[]) {
            Ok(stdout) => Ok(parser::parse_lsmod(&stdout)),
            Err(CommandError::NotFound(program)) => {
                log::warn!(
                    "[Kmod] {} not installed, reading {}",
                    program,
                    self.config.proc_modules.display()
                );
                let lines = self.store.read_lines(&self.config.proc_modules)?;
                Ok(parser::parse_proc_modules(&lines.join("\n")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Module names, either from the boot list (`persist`) or from `lsmod`.
    ///
    /// Names that could not be parsed from `lsmod` are kept as `None` so the
    /// result lines up with `lsmod()`.
    pub fn mod_list(&self, persist: bool) -> Result<Vec<Option<String>>> {
        if persist {
            Ok(self
                .read_persisted()?
                .names()
                .into_iter()
                .map(Some)
                .collect())
        } else {
            Ok(self.lsmod()?.into_iter().map(|record| record.name).collect())
        }
    }

    /// Whether `name` is currently loaded. `-` and `_` are interchangeable.
    pub fn is_loaded(&self, name: &str) -> Result<bool> {
        let wanted = parser::normalize_module_name(name);
        Ok(self
            .loaded_names()?
            .iter()
            .any(|loaded| parser::normalize_module_name(loaded) == wanted))
    }

    /// Load `name` with optional module parameters.
    ///
    /// Returns the sorted union of modules that appeared in `lsmod` and names
    /// newly added to the boot list (when `persist` is set).
    pub fn load(&self, name: &str, persist: bool, args: &[&str]) -> Result<Vec<String>> {
        validate_module_name(name)?;
        let pre = self.loaded_names()?;

        let mut argv = vec![name];
        argv.extend_from_slice(args);
        let result = self.executor.run_all(&self.config.load_program, &argv)?;
        if !result.success() {
            log::warn!("[Kmod] modprobe {} failed: {}", name, result.stderr);
            return Err(ModuleError::LoadFailed {
                name: name.to_string(),
                stderr: result.stderr,
            });
        }

        let post = self.loaded_names()?;
        let mut changed: BTreeSet<String> = post.difference(&pre).cloned().collect();
        if persist {
            changed.extend(self.set_persistent_module(name)?);
        }

        log_info!("[Kmod] {} {}: {:?}", ModuleAction::Load, name, changed);
        Ok(changed.into_iter().collect())
    }

    /// Unload `name`.
    ///
    /// Returns the names removed from the boot list: `[name]` when `persist`
    /// is set and the name was listed, otherwise empty. Modules that merely
    /// left `lsmod` are not reported. With `comment`, boot list entries are
    /// commented out instead of deleted.
    pub fn remove(&self, name: &str, persist: bool, comment: bool) -> Result<Vec<String>> {
        validate_module_name(name)?;

        let result = self.executor.run_all(&self.config.remove_program, &[name])?;
        if !result.success() {
            log::warn!("[Kmod] rmmod {} failed: {}", name, result.stderr);
            return Err(ModuleError::RemoveFailed {
                name: name.to_string(),
                stderr: result.stderr,
            });
        }

        let removed = if persist {
            self.remove_persistent_module(name, comment)?
        } else {
            BTreeSet::new()
        };

        log_info!("[Kmod] {} {}: {:?}", ModuleAction::Remove, name, removed);
        Ok(removed.into_iter().collect())
    }

    fn kernel_release(&self) -> Result<String> {
        if let Some(release) = &self.config.kernel_release {
            return Ok(release.clone());
        }
        let stdout = self.executor.run(&self.config.uname_program, &["-r"])?;
        Ok(stdout.trim().to_string())
    }

    fn loaded_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.lsmod()?.into_iter().filter_map(|record| record.name).collect())
    }

    fn read_persisted(&self) -> Result<PersistedModuleSet> {
        let lines = self.store.read_lines(&self.config.modules_conf)?;
        Ok(PersistedModuleSet::from_lines(lines))
    }

    fn set_persistent_module(&self, name: &str) -> Result<BTreeSet<String>> {
        let mut persisted = self.read_persisted()?;
        let added = persisted.add(name);
        if !added.is_empty() {
            self.store
                .write_lines(&self.config.modules_conf, persisted.lines())?;
            log_info!(
                "[Kmod] Added {} to {}",
                name,
                self.config.modules_conf.display()
            );
        }
        Ok(added)
    }

    fn remove_persistent_module(&self, name: &str, comment: bool) -> Result<BTreeSet<String>> {
        let mut persisted = self.read_persisted()?;
        let removed = persisted.remove(name, comment);
        if !removed.is_empty() {
            self.store
                .write_lines(&self.config.modules_conf, persisted.lines())?;
            log_info!(
                "[Kmod] Removed {} from {}",
                name,
                self.config.modules_conf.display()
            );
        }
        Ok(removed)
    }
}
