use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, SimilarityError};

pub const MISSING_API_KEY: &str = "GEMINI_API_KEY (or API_KEY) environment variable not set";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Main configuration structure for the similarity checker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum characters accepted per input text
    pub max_text_chars: usize,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!(
                "No .env file found in any expected location - continuing with env vars only"
            );
        }

        let config_path = env::var("SC_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = env::var("SC_SERVER_NAME") {
            self.server.name = name;
        }

        // GEMINI_API_KEY wins over the generic API_KEY
        if let Ok(api_key) = env::var("GEMINI_API_KEY").or_else(|_| env::var("API_KEY")) {
            self.gemini.api_key = api_key;
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            self.gemini.base_url = base_url;
        }
        if let Ok(temperature) = env::var("GEMINI_TEMPERATURE") {
            if let Ok(t) = temperature.parse() {
                self.gemini.temperature = t;
            }
        }
        if let Ok(timeout) = env::var("GEMINI_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.gemini.timeout_seconds = secs;
            }
        }

        if let Ok(max_chars) = env::var("SC_MAX_TEXT_CHARS") {
            if let Ok(max) = max_chars.parse() {
                self.limits.max_text_chars = max;
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err("Gemini temperature must be between 0.0 and 2.0".into());
        }
        if self.gemini.model.trim().is_empty() {
            return Err("Gemini model cannot be empty".into());
        }
        if self.gemini.timeout_seconds == 0 {
            return Err("Gemini timeout_seconds cannot be 0".into());
        }
        if self.limits.max_text_chars == 0 {
            return Err("limits.max_text_chars cannot be 0".into());
        }
        if self.gemini.api_key.is_empty() {
            return Err(MISSING_API_KEY.into());
        }
        Ok(())
    }

    /// The credential is the one setting the service cannot start without.
    pub fn require_api_key(&self) -> Result<&str> {
        let key = self.gemini.api_key.trim();
        if key.is_empty() {
            return Err(SimilarityError::Config(MISSING_API_KEY.to_string()));
        }
        Ok(key)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "similarity-checker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            gemini: GeminiConfig {
                api_key: String::new(),
                model: "gemini-2.5-flash".to_string(),
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
                temperature: 0.2,
                timeout_seconds: 120,
            },
            limits: LimitsConfig {
                max_text_chars: 100_000,
            },
        }
    }
}
