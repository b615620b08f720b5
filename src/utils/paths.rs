//! Path utilities for vidsweep
//!
//! Respects XDG Base Directory Specification

use crate::error::Result;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

const APP_NAME: &str = "vidsweep";

/// Get config directory path
/// Respects XDG_CONFIG_HOME, defaults to ~/.config/vidsweep
pub fn get_config_dir() -> PathBuf {
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from(env::var("HOME").unwrap_or_default()).join(".config"))
        });

    base.join(APP_NAME)
}

/// Get config file path
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

/// Ensure a directory exists, creating intermediate segments
pub async fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}
