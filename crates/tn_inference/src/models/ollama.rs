use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tn_core::{Article, ArticleProcessor, Error, Result};
use tracing::{error, info, warn};

use crate::text::{truncate_summary, truncate_with_ellipsis};
use crate::OllamaConfig;

const SUMMARY_INPUT_CHARS: usize = 10_000;
const RATING_INPUT_CHARS: usize = 5_000;
const MIN_REPLY_CHARS: usize = 20;
const DEFAULT_SCORE: f64 = 0.5;

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"\d+\.\d+|\d+").unwrap();
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// How a substitute model was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    SameFamily,
    FirstAvailable,
}

/// Outcome of matching the requested model against what the host serves.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResolution {
    Exact { model: String },
    Substituted { requested: String, resolved: String, via: Substitution },
    Unavailable { reason: String },
}

impl ModelResolution {
    /// The model to send requests to, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            ModelResolution::Exact { model } => Some(model.as_str()),
            ModelResolution::Substituted { resolved, .. } => Some(resolved.as_str()),
            ModelResolution::Unavailable { .. } => None,
        }
    }
}

/// Exact name, then a model of the same family (name before `:`), then the
/// first model the host lists.
pub fn resolve_model(requested: &str, available: &[String]) -> ModelResolution {
    if available.iter().any(|m| m == requested) {
        return ModelResolution::Exact { model: requested.to_string() };
    }

    let family = requested.split(':').next().unwrap_or(requested);
    let family_prefix = format!("{}:", family);
    if let Some(model) = available.iter().find(|m| *m == family || m.starts_with(&family_prefix)) {
        return ModelResolution::Substituted {
            requested: requested.to_string(),
            resolved: model.clone(),
            via: Substitution::SameFamily,
        };
    }

    match available.first() {
        Some(model) => ModelResolution::Substituted {
            requested: requested.to_string(),
            resolved: model.clone(),
            via: Substitution::FirstAvailable,
        },
        None => ModelResolution::Unavailable { reason: "no models installed on the host".to_string() },
    }
}

/// Ask the host which models it serves. Any failure is reported as `Unavailable`.
pub async fn probe(client: &Client, host: &str, requested: &str, timeout: Duration) -> ModelResolution {
    let response = match client
        .get(format!("{}/api/tags", host.trim_end_matches('/')))
        .timeout(timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return ModelResolution::Unavailable { reason: format!("host unreachable: {}", e) },
    };
    if !response.status().is_success() {
        return ModelResolution::Unavailable { reason: format!("host answered {}", response.status()) };
    }
    match response.json::<TagsResponse>().await {
        Ok(tags) => {
            let available: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
            resolve_model(requested, &available)
        }
        Err(e) => ModelResolution::Unavailable { reason: format!("unreadable model list: {}", e) },
    }
}

/// First number in the reply, clamped to `[0, 1]`.
pub fn parse_rating(reply: &str) -> f64 {
    NUMBER_RE
        .find(reply)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|score| score.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_SCORE)
}

/// Backend that talks to a local Ollama host.
pub struct OllamaProcessor {
    client: Arc<Client>,
    config: OllamaConfig,
    model: String,
    resolution: ModelResolution,
}

impl fmt::Debug for OllamaProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaProcessor")
            .field("client", &"<reqwest::Client>")
            .field("host", &self.config.host)
            .field("model", &self.model)
            .finish()
    }
}

impl OllamaProcessor {
    /// Probe the host and settle on a model. Fails when nothing usable is served.
    pub async fn connect(config: &OllamaConfig) -> Result<Self> {
        let client = Arc::new(Client::new());
        let resolution = probe(&client, &config.host, &config.model, config.probe_timeout).await;

        let model = match &resolution {
            ModelResolution::Exact { model } => {
                info!("🦙 Ollama model {} is available", model);
                model.clone()
            }
            ModelResolution::Substituted { requested, resolved, via } => {
                warn!("🦙 Ollama model {} not found, using {} ({:?})", requested, resolved, via);
                resolved.clone()
            }
            ModelResolution::Unavailable { reason } => {
                return Err(Error::Inference(format!("Ollama unavailable at {}: {}", config.host, reason)));
            }
        };

        Ok(Self {
            client,
            config: config.clone(),
            model,
            resolution,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn resolution(&self) -> &ModelResolution {
        &self.resolution
    }

    async fn generate(&self, prompt: String, options: GenerateOptions, timeout: Duration) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.host.trim_end_matches('/')))
            .timeout(timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status: status.as_u16(), message });
        }

        Ok(response.json::<GenerateResponse>().await?.response.trim().to_string())
    }

    async fn try_summary(&self, article: &Article, text: &str) -> Result<String> {
        let prompt = format!(
            "Summarize the following technology article in 2-3 concise sentences. \
             Focus on the key technical points and why they matter to developers.\n\n\
             Title: {}\n\nContent: {}\n\nSummary:",
            article.title,
            truncate_with_ellipsis(text, SUMMARY_INPUT_CHARS)
        );
        let options = GenerateOptions { temperature: 0.2, num_predict: Some(300) };
        self.generate(prompt, options, self.config.generate_timeout).await
    }

    /// Never fails: errors and useless replies become the title fallback.
    pub async fn generate_summary(&self, article: &Article) -> String {
        let text = match article.body_text() {
            Some(text) => text,
            None => return truncate_summary(&article.title_fallback()),
        };

        match self.try_summary(article, text).await {
            Ok(reply) if reply.chars().count() >= MIN_REPLY_CHARS => truncate_summary(&reply),
            Ok(reply) => {
                warn!("Ollama reply too short for {}: {:?}", article.short_title(), reply);
                truncate_summary(&article.title_fallback())
            }
            Err(e) => {
                error!("Ollama summary failed for {}: {}", article.short_title(), e);
                truncate_summary(&article.title_fallback())
            }
        }
    }

    async fn try_rating(&self, article: &Article, text: &str) -> Result<f64> {
        let prompt = format!(
            "Rate the importance of this technology article for professional Java and JVM developers \
             on a scale from 0.0 to 1.0, where 1.0 is critical news (major releases, security issues) \
             and 0.0 is irrelevant.\n\n\
             Title: {}\n\nSummary: {}\n\nContent: {}\n\n\
             Respond with only the number.\n\nRating:",
            article.title,
            article.summary,
            truncate_with_ellipsis(text, RATING_INPUT_CHARS)
        );
        let options = GenerateOptions { temperature: 0.1, num_predict: None };
        let reply = self.generate(prompt, options, self.config.rate_timeout).await?;
        Ok(parse_rating(&reply))
    }

    /// Never fails: errors and unparseable replies become 0.5.
    pub async fn rate_importance(&self, article: &Article) -> f64 {
        let text = match article.body_text() {
            Some(text) if !article.title.trim().is_empty() => text,
            _ => return DEFAULT_SCORE,
        };

        match self.try_rating(article, text).await {
            Ok(score) => score,
            Err(e) => {
                error!("Ollama rating failed for {}: {}", article.short_title(), e);
                DEFAULT_SCORE
            }
        }
    }
}

#[async_trait]
impl ArticleProcessor for OllamaProcessor {
    fn name(&self) -> &str {
        "Local-Host-LLM"
    }

    async fn process_articles(&self, articles: &mut [Article]) -> Result<()> {
        for article in articles.iter_mut() {
            article.summary = self.generate_summary(article).await;
            article.importance_score = Some(self.rate_importance(article).await);
            info!("🦙 {} scored {:.2}", article.short_title(), article.importance_score.unwrap_or_default());
        }
        Ok(())
    }
}
