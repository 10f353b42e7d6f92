use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::Entry;
use reqwest::Client;
use tn_core::{Article, ArticleSource, Error, FeedSource, Result};
use tracing::{debug, info};

use crate::extractor::{html_to_text, CRAWLER_USER_AGENT};

/// An RSS or Atom feed.
#[derive(Debug, Clone)]
pub struct RssSource {
    name: String,
    url: String,
    client: Arc<Client>,
    max_articles: usize,
}

impl RssSource {
    pub fn new(feed: &FeedSource, max_articles: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(CRAWLER_USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            name: feed.name.clone(),
            url: feed.url.clone(),
            client: Arc::new(client),
            max_articles,
        })
    }

    /// Parse a feed document into at most `max_articles` articles.
    /// Entries without a title or link are skipped.
    pub fn parse_feed(&self, bytes: &[u8]) -> Result<Vec<Article>> {
        let feed = feed_rs::parser::parse(bytes)
            .map_err(|e| Error::Source(format!("{}: unreadable feed: {}", self.name, e)))?;

        Ok(feed
            .entries
            .into_iter()
            .take(self.max_articles)
            .filter_map(|entry| self.entry_to_article(entry))
            .collect())
    }

    fn entry_to_article(&self, entry: Entry) -> Option<Article> {
        let title = entry.title.map(|t| html_to_text(&t.content)).filter(|t| !t.is_empty());
        let url = entry.links.first().map(|l| l.href.clone());
        let (title, url) = match (title, url) {
            (Some(title), Some(url)) => (title, url),
            _ => {
                debug!("{}: skipping entry {} without title or link", self.name, entry.id);
                return None;
            }
        };

        let mut article = Article::new(title, url, self.name.clone())
            .with_authors(entry.authors.into_iter().map(|p| p.name).collect())
            .with_categories(entry.categories.into_iter().map(|c| c.term).collect());

        if let Some(date) = entry.published.or(entry.updated) {
            article = article.with_published_date(date);
        }
        if let Some(summary) = entry.summary {
            let text = html_to_text(&summary.content);
            if !text.is_empty() {
                article = article.with_description(text);
            }
        }
        if let Some(body) = entry.content.and_then(|c| c.body) {
            article = article.with_content(html_to_text(&body));
        }
        Some(article)
    }
}

#[async_trait]
impl ArticleSource for RssSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Source(format!("{}: feed answered {}", self.name, status)));
        }
        let bytes = response.bytes().await?;
        let articles = self.parse_feed(&bytes)?;
        info!("📡 {} returned {} articles", self.name, articles.len());
        Ok(articles)
    }
}
