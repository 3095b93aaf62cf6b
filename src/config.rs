use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::StoreOptions;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ShoedistConfig {
    pub database: Option<String>,
    pub busy_timeout_ms: Option<u64>,
}

impl ShoedistConfig {
    pub fn store_options(&self) -> StoreOptions {
        let mut options = StoreOptions::default();
        if let Some(ms) = self.busy_timeout_ms {
            options.busy_timeout = Duration::from_millis(ms);
        }
        options
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("shoedist.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("shoedist.db")
}

/// Database path: explicit flag first, then the config file, then the default
pub fn resolve_database_path(flag: Option<&Path>, config: Option<&ShoedistConfig>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
        .unwrap_or_else(default_database_path)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ShoedistConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ShoedistConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ShoedistConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
