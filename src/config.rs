//! # Configuration
//!
//! Defaults, overridden by an optional `config.toml` in the user config directory,
//! overridden in turn by environment variables.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ConfigError, FetchError};
use crate::generation::{
    OpenAiBackend, RelayBackend, TextBackend, DEFAULT_OPENAI_MODEL, OPENAI_API_URL,
};
use crate::items::GitHubSource;
use crate::storage::{FileStore, SlotStore};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000/api/ai";
const APP_DIR: &str = "markai";

/// Which text generation backend to use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum GenerationConfig {
    Relay {
        #[serde(default = "default_relay_url")]
        url: String,
    },
    OpenAi {
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default = "default_openai_url")]
        base_url: String,
    },
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig::Relay {
            url: default_relay_url(),
        }
    }
}

fn default_relay_url() -> String {
    DEFAULT_RELAY_URL.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_openai_url() -> String {
    OPENAI_API_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github_api_url: String,
    /// Where persisted state lives. `None` means the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_api_url: crate::items::GITHUB_API_URL.to_string(),
            data_dir: None,
            generation: GenerationConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default config file location and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `MARKAI_*` and `OPENAI_API_KEY` overrides using `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("MARKAI_GITHUB_API_URL") {
            self.github_api_url = url;
        }
        if let Some(dir) = lookup("MARKAI_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = lookup("MARKAI_GENERATION_URL") {
            self.generation = GenerationConfig::Relay { url };
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            let model = lookup("MARKAI_OPENAI_MODEL").unwrap_or_else(default_openai_model);
            let base_url = match &self.generation {
                GenerationConfig::OpenAi { base_url, .. } => base_url.clone(),
                GenerationConfig::Relay { .. } => default_openai_url(),
            };
            self.generation = GenerationConfig::OpenAi {
                api_key: Some(key),
                model,
                base_url,
            };
        }
    }

    pub fn resolved_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    pub fn slot_store(&self) -> Result<SlotStore, ConfigError> {
        let dir = self.resolved_data_dir()?;
        debug!(dir = %dir.display(), "Using file store");
        Ok(SlotStore::new(Arc::new(FileStore::new(dir))))
    }

    pub fn item_source(&self) -> Result<GitHubSource, FetchError> {
        GitHubSource::new(&self.github_api_url)
    }

    pub fn text_backend(&self) -> Arc<dyn TextBackend> {
        match &self.generation {
            GenerationConfig::Relay { url } => Arc::new(RelayBackend::new(url)),
            GenerationConfig::OpenAi {
                api_key,
                model,
                base_url,
            } => Arc::new(
                OpenAiBackend::new(api_key.clone())
                    .with_model(model)
                    .with_base_url(base_url),
            ),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
