//! Shell configuration.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the workspace shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Maximum number of concurrently open tabs. When the limit is reached,
    /// opening another tab evicts the least recently used one.
    #[serde(default = "default_max_tabs")]
    pub max_tabs: usize,

    /// Header title shown when no tab is active.
    #[serde(default = "default_app_title")]
    pub app_title: String,

    /// Base URL fragments are loaded from (scheme, host, context path).
    #[serde(default)]
    pub base_url: String,

    /// UI language for message lookup.
    #[serde(default = "default_language")]
    pub language: String,

    /// Session authority strings (`resource:W` / `resource:R`) fed to the
    /// permission filter.
    #[serde(default)]
    pub authorities: Vec<String>,
}

fn default_max_tabs() -> usize {
    15
}

fn default_app_title() -> String {
    "Webdeck".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_tabs: default_max_tabs(),
            app_title: default_app_title(),
            base_url: String::new(),
            language: default_language(),
            authorities: Vec::new(),
        }
    }
}

impl ShellConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default path, creating the default file
    /// on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, creating a default file there when
    /// none exists.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            log::info!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: ShellConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            log::info!(
                "Config file not found, creating default at {}",
                path.display()
            );
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                log::error!("Failed to save default config: {e}");
                return Err(e);
            }
            Ok(config)
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    /// The configuration file path (XDG convention).
    pub fn config_path() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("webdeck").join("config.toml")
            } else {
                PathBuf::from("config.toml")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("webdeck").join("config.toml")
            } else {
                PathBuf::from("config.toml")
            }
        }
    }
}
