//! Tiered processing with graceful fallback.
//!
//! Tiers run in priority order over the whole batch until one succeeds.
//! Backends absorb per-article failures themselves; an `Err` from a tier
//! abandons that tier for the batch and hands every article to the next one.
//! The batch always comes back with a summary and a score on every article.

use async_trait::async_trait;
use tn_core::{Article, ArticleProcessor, Result};
use tracing::{error, info, warn};

use crate::models::{ExtractiveProcessor, OllamaProcessor, OpenAiProcessor, SimpleProcessor};
use crate::Config;

/// Score given to articles a normalizing tier left unscored.
pub const NORMALIZED_SCORE: f64 = 0.7;
/// Score given when every tier failed.
pub const TERMINAL_SCORE: f64 = 0.6;

pub struct Tier {
    processor: Box<dyn ArticleProcessor>,
    normalize_scores: bool,
}

impl Tier {
    /// A tier whose missing or non-positive scores are replaced after success.
    pub fn new(processor: Box<dyn ArticleProcessor>) -> Self {
        Self { processor, normalize_scores: true }
    }

    pub fn without_score_normalization(mut self) -> Self {
        self.normalize_scores = false;
        self
    }

    pub fn name(&self) -> &str {
        self.processor.name()
    }
}

pub struct AdaptiveProcessor {
    tiers: Vec<Tier>,
}

impl AdaptiveProcessor {
    /// Build every backend that can be built. The simple tier is always last.
    pub async fn new(config: &Config) -> Self {
        let mut tiers = Vec::new();

        if config.use_ollama {
            match OllamaProcessor::connect(&config.ollama).await {
                Ok(processor) => tiers.push(Tier::new(Box::new(processor))),
                Err(e) => warn!("⚠️ Skipping local LLM tier: {}", e),
            }
        } else {
            info!("Local LLM tier disabled");
        }

        match OpenAiProcessor::new(&config.openai) {
            Ok(processor) => tiers.push(Tier::new(Box::new(processor)).without_score_normalization()),
            Err(e) => warn!("⚠️ Skipping cloud LLM tier: {}", e),
        }

        match ExtractiveProcessor::new(config) {
            Ok(processor) => tiers.push(Tier::new(Box::new(processor))),
            Err(e) => warn!("⚠️ Skipping extractive tier: {}", e),
        }

        tiers.push(Tier::new(Box::new(SimpleProcessor::new(config.sentences_count))));

        let processor = Self { tiers };
        info!("🧠 Adaptive processor tiers: {}", processor.tier_names().join(" → "));
        processor
    }

    /// Use exactly the given tiers, in order.
    pub fn with_tiers(tiers: Vec<Tier>) -> Self {
        Self { tiers }
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(Tier::name).collect()
    }

    /// Summarize and score the batch. Same articles, same order, every one
    /// with a non-empty summary and a score in `[0, 1]`.
    pub async fn process_articles(&self, mut articles: Vec<Article>) -> Vec<Article> {
        self.process_in_place(&mut articles).await;
        articles
    }

    async fn process_in_place(&self, articles: &mut [Article]) {
        if articles.is_empty() {
            return;
        }

        let mut handled = false;
        for tier in &self.tiers {
            info!("🔄 Trying {} for {} articles", tier.name(), articles.len());
            match tier.processor.process_articles(articles).await {
                Ok(()) => {
                    if tier.normalize_scores {
                        normalize_scores(articles);
                    }
                    info!("✅ {} processed {} articles", tier.name(), articles.len());
                    handled = true;
                    break;
                }
                Err(e) if e.is_recoverable() => {
                    warn!("⚠️ {} gave up on the batch: {}", tier.name(), e);
                }
                Err(e) => {
                    error!("❌ {} failed on the batch: {}", tier.name(), e);
                }
            }
        }

        if !handled {
            error!("❌ Every tier failed, using titles for {} articles", articles.len());
            for article in articles.iter_mut() {
                article.summary = article.title_fallback();
                article.importance_score = Some(TERMINAL_SCORE);
            }
        }

        final_sweep(articles);
    }
}

fn normalize_scores(articles: &mut [Article]) {
    for article in articles.iter_mut() {
        match article.importance_score {
            Some(score) if score > 0.0 => {}
            _ => article.importance_score = Some(NORMALIZED_SCORE),
        }
    }
}

/// Backstop for tiers that skip normalization.
fn final_sweep(articles: &mut [Article]) {
    for article in articles.iter_mut() {
        match article.importance_score {
            None => article.importance_score = Some(NORMALIZED_SCORE),
            Some(score) if !(0.0..=1.0).contains(&score) => {
                warn!("Out of range score {} for {}", score, article.short_title());
                article.importance_score = Some(if score.is_nan() { NORMALIZED_SCORE } else { score.clamp(0.0, 1.0) });
            }
            Some(_) => {}
        }
        if article.summary.trim().is_empty() {
            warn!("Empty summary for {}, using title", article.short_title());
            article.summary = article.title_fallback();
        }
    }
}

#[async_trait]
impl ArticleProcessor for AdaptiveProcessor {
    fn name(&self) -> &str {
        "Adaptive"
    }

    async fn process_articles(&self, articles: &mut [Article]) -> Result<()> {
        self.process_in_place(articles).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(score: Option<f64>) -> Article {
        let mut article = Article::new("Title", "https://a.example/1", "Feed");
        article.importance_score = score;
        article
    }

    #[test]
    fn test_normalize_scores() {
        let mut articles = vec![article(None), article(Some(0.0)), article(Some(-0.3)), article(Some(0.42))];
        normalize_scores(&mut articles);
        let scores: Vec<f64> = articles.iter().map(|a| a.importance_score.unwrap()).collect();
        assert_eq!(scores, vec![0.7, 0.7, 0.7, 0.42]);
    }

    #[test]
    fn test_final_sweep() {
        let mut articles = vec![article(None), article(Some(0.0)), article(Some(1.7)), article(Some(f64::NAN))];
        final_sweep(&mut articles);
        let scores: Vec<f64> = articles.iter().map(|a| a.importance_score.unwrap()).collect();
        assert_eq!(scores, vec![0.7, 0.0, 1.0, 0.7]);
        assert!(articles.iter().all(|a| a.summary == "Title - From Feed"));
    }

    #[tokio::test]
    async fn test_new_always_ends_with_simple() {
        let config = Config { use_ollama: false, ..Config::default() };
        let processor = AdaptiveProcessor::new(&config).await;
        assert_eq!(processor.tier_names(), vec!["Local-Extractive", "Simple"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let processor = AdaptiveProcessor::with_tiers(Vec::new());
        assert!(processor.process_articles(Vec::new()).await.is_empty());
    }
}
