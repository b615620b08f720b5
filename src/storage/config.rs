//! Configuration management

use crate::error::{Result, VidSweepError};
use crate::types::Config;
use crate::utils::paths::{ensure_dir, get_config_dir, get_config_path};
use std::path::Path;
use tokio::fs;
use tokio::process::Command;

/// Load configuration from the default location, falling back to defaults
pub async fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()).await
}

/// Load configuration from `path`. Keys absent from the file keep their
/// default values. Values are not validated here so that `--edit` and CLI
/// overrides still work on a bad file; see [`validate`].
pub async fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).await?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Reject values the pipeline cannot run with. Call on the merged config.
pub fn validate(config: &Config) -> Result<()> {
    if config.chunk_size == 0 {
        return Err(VidSweepError::InvalidConfig(
            "chunk_size must be at least 1".into(),
        ));
    }
    if config.download_dir.is_empty() {
        return Err(VidSweepError::InvalidConfig(
            "download_dir must not be empty".into(),
        ));
    }
    if config.viewer_output.is_empty() {
        return Err(VidSweepError::InvalidConfig(
            "viewer_output must not be empty".into(),
        ));
    }
    Ok(())
}

/// Save configuration to file
pub async fn save_config(config: &Config) -> Result<()> {
    ensure_dir(get_config_dir()).await?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(get_config_path(), content).await?;
    Ok(())
}

/// Open config file in editor
pub async fn edit_config(editor: &str) -> Result<()> {
    let config_path = get_config_path();

    // Ensure config file exists
    if !config_path.exists() {
        save_config(&Config::default()).await?;
    }

    Command::new(editor)
        .arg(&config_path)
        .status()
        .await
        .map_err(|e| VidSweepError::Spawn(format!("Failed to start {}: {}", editor, e)))?;

    Ok(())
}
