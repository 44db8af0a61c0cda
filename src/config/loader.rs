use super::{get_global_config_dir, DebugConfig};
use crate::error::{DebugError, Result};
use std::path::Path;
use tokio::fs;

pub struct ConfigLoader {
    config: DebugConfig,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config: DebugConfig::default(),
        }
    }

    /// Load the explicit file when given, the global file otherwise, then apply env overrides.
    pub async fn load(explicit: Option<&Path>) -> Result<DebugConfig> {
        let mut loader = Self::new();
        match explicit {
            Some(path) => loader.load_with_explicit_path(path).await?,
            None => loader.load_global().await?,
        }
        loader.config.merge_env_vars();
        Ok(loader.get_config())
    }

    pub async fn load_global(&mut self) -> Result<()> {
        let config_path = get_global_config_dir()?.join("config.toml");

        if config_path.exists() {
            tracing::debug!("Loading global config from {}", config_path.display());
            self.config = Self::parse_file(&config_path).await?;
        }

        Ok(())
    }

    pub async fn load_with_explicit_path(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(DebugError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        tracing::debug!("Loading config from {}", path.display());
        self.config = Self::parse_file(path).await?;
        Ok(())
    }

    async fn parse_file(path: &Path) -> Result<DebugConfig> {
        let content = fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            _ => Err(DebugError::Config(format!(
                "Unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    pub fn get_config(&self) -> DebugConfig {
        self.config.clone()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
