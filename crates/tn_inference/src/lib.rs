use std::fmt;
use std::time::Duration;

use tn_core::config::{DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use tn_core::Settings;

pub mod adaptive;
pub mod lsa;
pub mod models;
pub mod scoring;
pub mod text;

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub probe_timeout: Duration,
    pub generate_timeout: Duration,
    pub rate_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            probe_timeout: Duration::from_secs(5),
            generate_timeout: Duration::from_secs(30),
            rate_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Everything the processors need to build themselves.
#[derive(Debug, Clone)]
pub struct Config {
    pub use_ollama: bool,
    pub ollama: OllamaConfig,
    pub openai: OpenAiConfig,
    /// Sentences kept by the extractive and simple summarizers
    pub sentences_count: usize,
    /// Share of LSA topic dimensions kept when ranking sentences
    pub reduction_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_ollama: true,
            ollama: OllamaConfig::default(),
            openai: OpenAiConfig::default(),
            sentences_count: 3,
            reduction_ratio: 1.0,
        }
    }
}

impl Config {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            use_ollama: settings.enable_ollama,
            ollama: OllamaConfig {
                host: settings.ollama_host.clone(),
                model: settings.ollama_model.clone(),
                ..OllamaConfig::default()
            },
            openai: OpenAiConfig {
                api_key: settings.openai_api_key.clone(),
                model: settings.openai_model.clone(),
                base_url: settings.openai_base_url.clone(),
                ..OpenAiConfig::default()
            },
            ..Config::default()
        }
    }
}

pub mod prelude {
    pub use super::adaptive::{AdaptiveProcessor, Tier};
    pub use super::models::create_processor;
    pub use super::Config;
    pub use tn_core::{Article, ArticleProcessor, Error, Result};
}

pub use adaptive::AdaptiveProcessor;
pub use models::create_processor;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings() {
        let settings = Settings::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "ENABLE_OLLAMA" => Some("false".to_string()),
            "OLLAMA_MODEL" => Some("llama3:8b".to_string()),
            _ => None,
        })
        .unwrap();
        let config = Config::from_settings(&settings);
        assert!(!config.use_ollama);
        assert_eq!(config.ollama.model, "llama3:8b");
        assert_eq!(config.ollama.generate_timeout, Duration::from_secs(30));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.sentences_count, 3);
        assert!(!format!("{:?}", config).contains("sk-test"));
    }
}
