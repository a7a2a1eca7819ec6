use crate::error::{ChatError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl ChatConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("CHAT_API_KEY")
            .map_err(|_| ChatError::Config("CHAT_API_KEY not set".to_string()))?;

        let endpoint = env::var("CHAT_ENDPOINT").unwrap_or_else(|_| default_endpoint());

        let model = env::var("CHAT_MODEL").unwrap_or_else(|_| default_model());

        let temperature = match env::var("CHAT_TEMPERATURE") {
            Ok(raw) => raw
                .parse::<f32>()
                .map_err(|e| ChatError::Config(format!("Invalid temperature value: {}", e)))?,
            Err(_) => default_temperature(),
        };

        Ok(ChatConfig {
            api: ApiConfig {
                api_key,
                endpoint,
                model,
                temperature,
            },
        })
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: ChatConfig = toml::from_str(&contents)
            .map_err(|e| ChatError::Config(format!("Failed to parse config file: {}", e)))?;

        // Allow environment variables to override file config
        if let Ok(api_key) = env::var("CHAT_API_KEY") {
            config.api.api_key = api_key;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.api_key.is_empty() {
            return Err(ChatError::Config("API key is empty".to_string()));
        }

        if self.api.endpoint.is_empty() {
            return Err(ChatError::Config("Endpoint is empty".to_string()));
        }

        if self.api.model.is_empty() {
            return Err(ChatError::Config("Model is empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.api.temperature) {
            return Err(ChatError::Config(format!(
                "Temperature must be within 0.0..=2.0, got {}",
                self.api.temperature
            )));
        }

        Ok(())
    }
}
