use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tn_core::{Article, ArticleProcessor, Error, Result};
use tracing::{error, info, warn};

use crate::text::{truncate_chars, truncate_summary};
use crate::OpenAiConfig;

const CONTENT_INPUT_CHARS: usize = 12_000;
const DEFAULT_SCORE: f64 = 0.5;
const NO_CONTENT_SUMMARY: &str = "No content available to summarize.";
const FAILED_SUMMARY: &str = "Failed to generate summary.";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ScoreReply {
    score: Option<f64>,
}

/// Errors that say the service itself is unusable: rate limits, rejected
/// credentials, server errors, timeouts and refused connections. They end the
/// batch so the next tier takes over. Anything else is specific to one article.
fn aborts_batch(err: &Error) -> bool {
    match err {
        Error::RateLimited(_) => true,
        Error::Api { status, .. } => matches!(status, 401 | 403 | 500..=599),
        Error::Http(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}

/// Backend for any OpenAI-compatible chat completions endpoint.
pub struct OpenAiProcessor {
    client: Arc<Client>,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for OpenAiProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProcessor")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProcessor {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("OpenAI API key is required".to_string()))?;

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::RateLimited(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status: status.as_u16(), message });
        }

        let body = response.json::<ChatResponse>().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::Inference("completion without content".to_string()))
    }

    /// Per-article failures become a fixed message; batch-level ones propagate.
    pub async fn generate_summary(&self, article: &Article) -> Result<String> {
        if article.content.trim().is_empty() {
            return Ok(NO_CONTENT_SUMMARY.to_string());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(
                    "You are a technical news editor who writes concise summaries of technology \
                     articles for Java and JVM developers.",
                ),
                ChatMessage::user(format!(
                    "Summarize this article in 2-3 sentences. Keep the summary under 150 characters.\n\n\
                     Title: {}\n\nContent: {}",
                    article.title,
                    truncate_chars(&article.content, CONTENT_INPUT_CHARS)
                )),
            ],
            max_tokens: 150,
            temperature: 0.3,
            response_format: None,
        };

        match self.chat(&request).await {
            Ok(summary) if !summary.is_empty() => Ok(truncate_summary(&summary)),
            Ok(_) => Ok(FAILED_SUMMARY.to_string()),
            Err(e) if aborts_batch(&e) => Err(e),
            Err(e) => {
                error!("OpenAI summary failed for {}: {}", article.short_title(), e);
                Ok(FAILED_SUMMARY.to_string())
            }
        }
    }

    /// Per-article failures become 0.5; batch-level ones propagate.
    pub async fn rate_importance(&self, article: &Article) -> Result<f64> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(
                    "You rate technology news for professional Java and JVM developers. \
                     Reply with a JSON object of the form {\"score\": <number between 0.0 and 1.0>}.",
                ),
                ChatMessage::user(format!(
                    "Title: {}\n\nSummary: {}\n\nHow important is this article?",
                    article.title, article.summary
                )),
            ],
            max_tokens: 50,
            temperature: 0.2,
            response_format: Some(ResponseFormat { kind: "json_object".to_string() }),
        };

        let reply = match self.chat(&request).await {
            Ok(reply) => reply,
            Err(e) if aborts_batch(&e) => return Err(e),
            Err(e) => {
                error!("OpenAI rating failed for {}: {}", article.short_title(), e);
                return Ok(DEFAULT_SCORE);
            }
        };

        match serde_json::from_str::<ScoreReply>(&reply) {
            Ok(parsed) => Ok(parsed.score.unwrap_or(DEFAULT_SCORE).clamp(0.0, 1.0)),
            Err(e) => {
                warn!("Unparseable rating for {}: {}", article.short_title(), e);
                Ok(DEFAULT_SCORE)
            }
        }
    }
}

#[async_trait]
impl ArticleProcessor for OpenAiProcessor {
    fn name(&self) -> &str {
        "Cloud-LLM"
    }

    async fn process_articles(&self, articles: &mut [Article]) -> Result<()> {
        for article in articles.iter_mut() {
            article.summary = self.generate_summary(article).await?;
            article.importance_score = Some(self.rate_importance(article).await?);
            info!("☁️ {} scored {:.2}", article.short_title(), article.importance_score.unwrap_or_default());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = OpenAiConfig::default();
        assert!(matches!(OpenAiProcessor::new(&config), Err(Error::Config(_))));

        let config = OpenAiConfig { api_key: Some("  ".to_string()), ..OpenAiConfig::default() };
        assert!(OpenAiProcessor::new(&config).is_err());

        let config = OpenAiConfig { api_key: Some("sk-test".to_string()), ..OpenAiConfig::default() };
        let processor = OpenAiProcessor::new(&config).unwrap();
        assert!(!format!("{:?}", processor).contains("sk-test"));
    }

    #[test]
    fn test_batch_abort_classification() {
        assert!(aborts_batch(&Error::RateLimited("slow down".to_string())));
        assert!(aborts_batch(&Error::Api { status: 401, message: String::new() }));
        assert!(aborts_batch(&Error::Api { status: 403, message: String::new() }));
        assert!(aborts_batch(&Error::Api { status: 500, message: String::new() }));
        assert!(aborts_batch(&Error::Api { status: 503, message: String::new() }));
        assert!(!aborts_batch(&Error::Api { status: 400, message: String::new() }));
        assert!(!aborts_batch(&Error::Api { status: 404, message: String::new() }));
        assert!(!aborts_batch(&Error::Inference("empty".to_string())));
    }

    #[tokio::test]
    async fn test_refused_connection_aborts_batch() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let config = OpenAiConfig { api_key: Some("sk-test".to_string()), base_url, ..OpenAiConfig::default() };
        let processor = OpenAiProcessor::new(&config).unwrap();
        let article = Article::new("Title", "https://a.example/1", "Feed").with_content("Some JVM news.");
        let err = processor.generate_summary(&article).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_empty_content_skips_request() {
        let config = OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            ..OpenAiConfig::default()
        };
        let processor = OpenAiProcessor::new(&config).unwrap();
        let article = Article::new("Title", "https://a.example/1", "Feed");
        assert_eq!(processor.generate_summary(&article).await.unwrap(), NO_CONTENT_SUMMARY);
    }
}
