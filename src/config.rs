//! Settings loaded from `config.toml` in the platform config directory.
//!
//! Every key is optional. A missing file yields the defaults; a file that
//! does not parse is an error rather than being silently ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

const CONFIG_FILENAME: &str = "config.toml";
const LOG_FILENAME: &str = "catalogtui.log";
pub(crate) const API_URL_ENV: &str = "CATALOGTUI_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) api_url: String,
    pub(crate) page_size: usize,
    pub(crate) search_debounce_ms: u64,
    pub(crate) request_timeout_secs: u64,
    pub(crate) log_level: String,
    pub(crate) log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".into(),
            page_size: 10,
            search_debounce_ms: 300,
            request_timeout_secs: 30,
            log_level: "info".into(),
            log_file: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "catalogtui", "CatalogTUI")
}

impl Config {
    /// Load from the default location and apply the environment override.
    pub(crate) fn load() -> Result<Self> {
        let mut config = match project_dirs() {
            Some(dirs) => Self::load_from(&dirs.config_dir().join(CONFIG_FILENAME))?,
            None => Self::default(),
        };
        config.apply_env(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read `path`; a missing file gives the defaults.
    pub(crate) fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.api_url.trim().is_empty() {
            bail!("api_url must not be empty");
        }
        Ok(())
    }

    pub(crate) fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured log file, or `catalogtui.log` in the data directory.
    pub(crate) fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let dirs = project_dirs()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(data_dir.join(LOG_FILENAME))
    }
}
