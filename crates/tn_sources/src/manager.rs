use tn_core::filters::{deduplicate, filter_recent, filter_relevant};
use tn_core::{Article, ArticleSource};
use tracing::{error, info};

use crate::extractor::ContentExtractor;

/// Collects from every source and narrows the result down to fresh,
/// unique, on-topic articles.
pub struct SourceManager {
    sources: Vec<Box<dyn ArticleSource>>,
    recent_days: i64,
    extractor: Option<ContentExtractor>,
}

impl SourceManager {
    pub fn new(recent_days: i64) -> Self {
        Self {
            sources: Vec::new(),
            recent_days,
            extractor: None,
        }
    }

    pub fn add_source(&mut self, source: Box<dyn ArticleSource>) {
        self.sources.push(source);
    }

    pub fn with_sources(mut self, sources: Vec<Box<dyn ArticleSource>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Fetch full page text for the articles that survive filtering.
    pub fn with_extractor(mut self, extractor: ContentExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Everything every source returned. A failing source is logged and skipped.
    pub async fn fetch_all(&self) -> Vec<Article> {
        let mut articles = Vec::new();
        for source in &self.sources {
            match source.fetch_articles().await {
                Ok(batch) => articles.extend(batch),
                Err(e) => error!("❌ Source {} failed: {}", source.name(), e),
            }
        }
        info!("📰 Fetched {} articles from {} sources", articles.len(), self.sources.len());
        articles
    }

    pub async fn collect(&self) -> Vec<Article> {
        let articles = self.fetch_all().await;
        let articles = deduplicate(articles);
        let articles = filter_recent(articles, self.recent_days);
        let mut articles = filter_relevant(articles);

        if let Some(extractor) = &self.extractor {
            extractor.enhance(&mut articles).await;
        }
        articles
    }
}
