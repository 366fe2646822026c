use crate::error::{BurnsubError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Default Gemini model used for both recognition and translation.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default number of frames sampled per second of video.
pub const DEFAULT_CAPTURE_RATE: f64 = 2.0;

/// Default translation target.
pub const DEFAULT_TARGET_LANGUAGE: &str = "vi";

/// Default MJPEG quality scale for sampled frames (2 is best, 31 is worst).
pub const DEFAULT_JPEG_QUALITY: u8 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub model: String,
    pub target_language: String,
    pub capture_rate: f64,
    pub concurrency: usize,
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            capture_rate: DEFAULT_CAPTURE_RATE,
            concurrency: 1,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                match toml::from_str::<Config>(&contents) {
                    Ok(file_config) => config = file_config,
                    Err(e) => warn!("Ignoring malformed config {:?}: {}", config_path, e),
                }
            }
        }

        // Override with environment variables
        if let Some(key) = api_key_from_env(|name| std::env::var(name).ok()) {
            config.gemini_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("BURNSUB_MODEL") {
            config.model = model;
        }
        if let Ok(lang) = std::env::var("BURNSUB_TARGET_LANG") {
            config.target_language = lang;
        }
        if let Ok(rate) = std::env::var("BURNSUB_CAPTURE_RATE") {
            if let Ok(r) = rate.parse() {
                config.capture_rate = r;
            }
        }
        if let Ok(concurrency) = std::env::var("BURNSUB_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                config.concurrency = c;
            }
        }
        if let Ok(quality) = std::env::var("BURNSUB_JPEG_QUALITY") {
            if let Ok(q) = quality.parse() {
                config.jpeg_quality = q;
            }
        }

        Ok(config)
    }

    /// Check everything except the API key, which is only demanded by the
    /// first call to the external service.
    pub fn validate(&self) -> Result<()> {
        if !self.capture_rate.is_finite() || self.capture_rate <= 0.0 {
            return Err(BurnsubError::Config(format!(
                "Capture rate must be a positive number, got {}",
                self.capture_rate
            )));
        }

        if self.concurrency == 0 {
            return Err(BurnsubError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        if self.target_language.trim().is_empty() {
            return Err(BurnsubError::Config(
                "Target language must not be empty".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(BurnsubError::Config("Model must not be empty".to_string()));
        }

        if !(2..=31).contains(&self.jpeg_quality) {
            return Err(BurnsubError::Config(format!(
                "JPEG quality must be between 2 and 31, got {}",
                self.jpeg_quality
            )));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("burnsub").join("config.toml"))
    }
}

/// `GEMINI_API_KEY`, else `API_KEY`. Blank values count as unset.
fn api_key_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["GEMINI_API_KEY", "API_KEY"]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|key| !key.trim().is_empty())
}
