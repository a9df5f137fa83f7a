use crate::ai::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::{Result, VerbumError};
use crate::navigation::Cursor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "VERBUM_API_KEY";
pub const CONTENT_URL_ENV: &str = "VERBUM_CONTENT_URL";
pub const BIBLES_DIR_ENV: &str = "VERBUM_BIBLES_DIR";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StartCursor {
    pub edition: String,
    pub book: String,
    pub chapter: u32,
}

impl Default for StartCursor {
    fn default() -> Self {
        Self {
            edition: "LATVUL".to_string(),
            book: "Exodus".to_string(),
            chapter: 1,
        }
    }
}

impl From<&StartCursor> for Cursor {
    fn from(start: &StartCursor) -> Self {
        Cursor::new(&start.edition, &start.book, start.chapter)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub bibles_dir: PathBuf,
    pub provider_url: String,
    pub model: String,
    /// Read from the environment only
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            bibles_dir: PathBuf::from("bibles"),
            provider_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub start: StartCursor,
    /// Base URL serving `/bibles/{id}.json`
    pub content_url: String,
    /// Read editions from disk instead of `content_url` when set
    pub bibles_dir: Option<PathBuf>,
    /// Base URL of the `/api/get-info` commentary route
    pub commentary_url: String,
    pub cache_capacity: usize,
    pub retry_attempts: u32,
    pub continuous: bool,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start: StartCursor::default(),
            content_url: "http://localhost:8000".to_string(),
            bibles_dir: None,
            commentary_url: "http://localhost:8000".to_string(),
            cache_capacity: 256,
            retry_attempts: 3,
            continuous: false,
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default path and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| VerbumError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| VerbumError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| VerbumError::Config(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| VerbumError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| VerbumError::Config(e.to_string()))?;
        Ok(())
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.server.api_key = Some(key);
        }
        if let Some(url) = lookup(CONTENT_URL_ENV).filter(|u| !u.is_empty()) {
            self.content_url = url;
        }
        if let Some(dir) = lookup(BIBLES_DIR_ENV).filter(|d| !d.is_empty()) {
            self.bibles_dir = Some(PathBuf::from(&dir));
            self.server.bibles_dir = PathBuf::from(dir);
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// `{config_dir}/verbum`, also home to the log files
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| VerbumError::Config("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("verbum"))
    }
}
