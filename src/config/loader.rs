//! Config file loader and serialization.

use super::ManagerConfig;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the per-user config path: ~/.config/kmod-manager/config.json
pub fn get_global_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::ValidationFailed("Cannot determine home directory".to_string())
    })?;

    Ok(home.join(".config/kmod-manager").join("config.json"))
}

/// Load config from JSON file.
pub fn load_config_from_file(path: &Path) -> Result<ManagerConfig, ConfigError> {
    validate_config_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Configuration file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    let config: ManagerConfig = serde_json::from_str(&content).map_err(ConfigError::InvalidJson)?;
    validate_config(&config)?;

    log::debug!("[Config] loaded {}", path.display());
    Ok(config)
}

/// Load the config at `path`, or defaults when the file does not exist.
pub fn load_or_default(path: &Path) -> Result<ManagerConfig, ConfigError> {
    match load_config_from_file(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            log::info!("[Config] {} not found, using defaults", path.display());
            Ok(ManagerConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Save config to JSON file.
pub fn save_config_to_file(config: &ManagerConfig, path: &Path) -> Result<(), ConfigError> {
    validate_config_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(ConfigError::IoError)?;
        }
    }

    let json_content = serde_json::to_string_pretty(config).map_err(ConfigError::InvalidJson)?;
    fs::write(path, json_content).map_err(ConfigError::IoError)?;

    Ok(())
}

/// Validate config path (.json extension required).
pub fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path cannot be empty".to_string(),
        ));
    }

    match path.extension() {
        Some(ext) if ext == "json" => Ok(()),
        Some(ext) => Err(ConfigError::ValidationFailed(format!(
            "Configuration file must have .json extension, got .{}",
            ext.to_string_lossy()
        ))),
        None => Err(ConfigError::ValidationFailed(
            "Configuration file must have .json extension".to_string(),
        )),
    }
}

/// Reject configs that would make every operation fail.
pub fn validate_config(config: &ManagerConfig) -> Result<(), ConfigError> {
    if config.modules_conf.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "modules_conf cannot be empty".to_string(),
        ));
    }

    let programs = [
        ("lsmod_program", &config.lsmod_program),
        ("load_program", &config.load_program),
        ("remove_program", &config.remove_program),
        ("uname_program", &config.uname_program),
    ];
    for (field, program) in programs {
        if program.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(format!(
                "{} cannot be empty",
                field
            )));
        }
    }

    if let Some(release) = &config.kernel_release {
        if release.trim().is_empty() || release.contains('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid kernel_release: {:?}",
                release
            )));
        }
    }

    Ok(())
}
