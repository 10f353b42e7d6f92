pub mod extractive;
pub mod ollama;
pub mod openai;
pub mod simple;

use tn_core::{ArticleProcessor, Error, Result};

use crate::adaptive::AdaptiveProcessor;
use crate::Config;

pub use extractive::{ExtractiveProcessor, ExtractiveSummarizer};
pub use ollama::{ModelResolution, OllamaProcessor};
pub use openai::OpenAiProcessor;
pub use simple::{SimpleProcessor, SimpleSummarizer};

pub const PROCESSOR_NAMES: &[&str] = &["adaptive", "ollama", "openai", "extractive", "simple"];

/// Build a processor by name. Only the adaptive processor is guaranteed to
/// construct; the others fail when their backend is not usable.
pub async fn create_processor(name: &str, config: &Config) -> Result<Box<dyn ArticleProcessor>> {
    match name.to_lowercase().as_str() {
        "adaptive" => Ok(Box::new(AdaptiveProcessor::new(config).await)),
        "ollama" => Ok(Box::new(OllamaProcessor::connect(&config.ollama).await?)),
        "openai" => Ok(Box::new(OpenAiProcessor::new(&config.openai)?)),
        "extractive" => Ok(Box::new(ExtractiveProcessor::new(config)?)),
        "simple" => Ok(Box::new(SimpleProcessor::new(config.sentences_count))),
        other => Err(Error::Config(format!(
            "unknown processor '{}', expected one of: {}",
            other,
            PROCESSOR_NAMES.join(", ")
        ))),
    }
}
