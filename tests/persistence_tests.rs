//! End-to-end persistence tests against real files on disk.
//!
//! Commands are faked; the boot module list goes through `DiskStore`.

mod common;

use common::FakeExecutor;
use kmod_manager::config::loader;
use kmod_manager::{CommandResult, DiskStore, KmodManager, ManagerConfig};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn disk_manager(temp_dir: &TempDir, executor: FakeExecutor) -> KmodManager {
    let mut config = ManagerConfig::with_modules_conf(temp_dir.path().join("modules"));
    config.kernel_release = Some("6.6.0".to_string());
    config.modules_dir = temp_dir.path().join("lib/modules");
    KmodManager::new(config, Arc::new(executor), Arc::new(DiskStore::new()))
}

fn ok_executor() -> FakeExecutor {
    FakeExecutor::new()
        .with("lsmod", CommandResult::ok("Module Size Used by\n"))
        .with("modprobe", CommandResult::ok(""))
        .with("rmmod", CommandResult::ok(""))
}

#[test]
fn test_load_persist_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let kmod = disk_manager(&temp_dir, ok_executor());

    assert_eq!(kmod.load("lp", true, &[]).unwrap(), vec!["lp"]);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("modules")).unwrap(),
        "lp\n"
    );
}

#[test]
fn test_edits_preserve_comments_and_order() {
    let temp_dir = TempDir::new().unwrap();
    let conf = temp_dir.path().join("modules");
    fs::write(
        &conf,
        "# /etc/modules: kernel modules to load at boot time.\n\nloop max_loop=64\nlp\n",
    )
    .unwrap();
    let kmod = disk_manager(&temp_dir, ok_executor());

    kmod.load("kvm", true, &[]).unwrap();
    kmod.remove("lp", true, false).unwrap();

    assert_eq!(
        fs::read_to_string(&conf).unwrap(),
        "# /etc/modules: kernel modules to load at boot time.\n\nloop max_loop=64\nkvm\n"
    );
    assert_eq!(
        kmod.mod_list(true).unwrap(),
        vec![Some("loop".to_string()), Some("kvm".to_string())]
    );
}

#[test]
fn test_remove_persist_missing_file_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let kmod = disk_manager(&temp_dir, ok_executor());

    assert!(kmod.remove("lp", true, false).unwrap().is_empty());
    assert!(!temp_dir.path().join("modules").exists());
}

#[test]
fn test_config_file_drives_manager() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");

    let mut config = ManagerConfig::with_modules_conf(temp_dir.path().join("boot.conf"));
    config.load_program = "insmod-wrapper".to_string();
    loader::save_config_to_file(&config, &config_path).unwrap();

    let loaded = loader::load_config_from_file(&config_path).unwrap();
    let executor = Arc::new(
        FakeExecutor::new()
            .with("lsmod", CommandResult::ok(""))
            .with("insmod-wrapper", CommandResult::ok("")),
    );
    let kmod = KmodManager::new(loaded, executor.clone(), Arc::new(DiskStore::new()));

    kmod.load("cheese", true, &[]).unwrap();
    assert!(executor.calls().contains(&"insmod-wrapper cheese".to_string()));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("boot.conf")).unwrap(),
        "cheese\n"
    );
}

#[cfg(unix)]
#[test]
fn test_persist_through_modules_load_d_symlink() {
    let temp_dir = TempDir::new().unwrap();
    let etc_modules = temp_dir.path().join("modules");
    let load_d = temp_dir.path().join("modules-load.d");
    fs::create_dir(&load_d).unwrap();
    fs::write(&etc_modules, "lp\n").unwrap();
    std::os::unix::fs::symlink("../modules", load_d.join("modules.conf")).unwrap();

    let config = ManagerConfig::with_modules_conf(kmod_manager::config::default_modules_conf(&load_d));
    let kmod = KmodManager::new(config, Arc::new(ok_executor()), Arc::new(DiskStore::new()));

    kmod.load("kvm", true, &[]).unwrap();
    kmod.remove("lp", true, false).unwrap();

    assert!(fs::symlink_metadata(load_d.join("modules.conf"))
        .unwrap()
        .file_type()
        .is_symlink());
    assert_eq!(fs::read_to_string(&etc_modules).unwrap(), "kvm\n");
}
