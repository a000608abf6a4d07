use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::view::DEFAULT_PAGE_SIZE;

pub const CONFIG_FILE: &str = "hkpass.toml";
pub const DEFAULT_STORE_FILE: &str = "passwords.hkpswd";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Store file. Relative paths are taken from the directory holding the config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,
    /// Accounts per page in `list` and `show`.
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.page_size == 0 {
            return Err(StoreError::Config("page_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Returns the config file path for a given project root.
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE)
}

/// Read and parse the config at `path`. Returns an error if it does not exist.
pub fn read(path: &Path) -> Result<Config, StoreError> {
    if !path.exists() {
        return Err(StoreError::Config(format!(
            "config file {} not found",
            path.display()
        )));
    }
    let raw = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&raw)
        .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Like [`read`], but a missing file yields the defaults.
pub fn load(path: &Path) -> Result<Config, StoreError> {
    if path.exists() {
        read(path)
    } else {
        Ok(Config::default())
    }
}

pub fn write(path: &Path, config: &Config) -> Result<(), StoreError> {
    config.validate()?;
    let raw = toml::to_string(config).map_err(|e| StoreError::Config(e.to_string()))?;
    std::fs::write(path, raw)?;
    Ok(())
}

/// Store file to use: the explicit one, else the config's, else the default
/// file in `project_root`.
pub fn store_path(
    explicit: Option<&Path>,
    config: &Config,
    config_file: &Path,
    project_root: &Path,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match &config.store {
        Some(store) if store.is_relative() => config_file
            .parent()
            .unwrap_or(project_root)
            .join(store),
        Some(store) => store.clone(),
        None => project_root.join(DEFAULT_STORE_FILE),
    }
}

/// Returns the current project root (cwd).
pub fn project_root() -> Result<PathBuf, StoreError> {
    std::env::current_dir().map_err(StoreError::Io)
}
