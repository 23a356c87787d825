//! Resolved configuration shared by every command.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tally_db::TallyDb;
use tally_protocol::paths::default_config_path;
use tally_protocol::TallyConfig;

#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: TallyConfig,
    pub config_path: PathBuf,
    /// Whether `config_path` existed when loaded.
    pub config_found: bool,
}

impl CliContext {
    /// Load `--config` (or `~/.tally/config.toml`) and apply the `--database` override.
    pub fn load(config_path: Option<&Path>, database: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);
        let config_found = config_path.exists();
        let mut config = TallyConfig::load_or_default(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        if let Some(database) = database {
            config.registry.database_path = database.to_path_buf();
        }
        Ok(Self {
            config,
            config_path,
            config_found,
        })
    }

    pub async fn open_registry(&self) -> Result<TallyDb> {
        let path = &self.config.registry.database_path;
        TallyDb::open(path)
            .await
            .with_context(|| format!("Failed to open registry {}", path.display()))
    }
}
