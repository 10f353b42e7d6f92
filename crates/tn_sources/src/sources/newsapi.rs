use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tn_core::{Article, ArticleSource, Error, Result};
use tracing::{error, info};

const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub source: NewsApiSourceRef,
    pub published_at: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsApiSourceRef {
    pub name: Option<String>,
}

/// The NewsAPI `everything` endpoint, queried per source id.
pub struct NewsApiSource {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    source_ids: Vec<String>,
    page_size: usize,
    days_back: i64,
}

impl fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("source_ids", &self.source_ids)
            .field("page_size", &self.page_size)
            .field("days_back", &self.days_back)
            .finish()
    }
}

impl NewsApiSource {
    pub fn new(api_key: Option<String>, source_ids: Vec<String>, page_size: usize, days_back: i64) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("NewsAPI key is required".to_string()))?;
        let client = Client::builder().timeout(Duration::from_secs(20)).build()?;
        Ok(Self {
            client: Arc::new(client),
            api_key,
            base_url: NEWS_API_URL.to_string(),
            source_ids,
            page_size,
            days_back,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Articles of a response body; items without title or url are dropped.
    pub fn convert(&self, response: NewsApiResponse) -> Vec<Article> {
        response
            .articles
            .into_iter()
            .filter_map(|item| {
                let title = item.title.filter(|t| !t.trim().is_empty() && t != "[Removed]")?;
                let url = item.url.filter(|u| !u.trim().is_empty())?;
                let source_name = item.source.name.unwrap_or_else(|| "NewsAPI".to_string());

                let mut article = Article::new(title, url, source_name)
                    .with_authors(item.author.into_iter().collect());
                if let Some(date) = item
                    .published_at
                    .as_deref()
                    .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                {
                    article = article.with_published_date(date.with_timezone(&Utc));
                }
                if let Some(description) = item.description.filter(|d| !d.trim().is_empty()) {
                    article = article.with_description(description);
                }
                if let Some(content) = item.content {
                    article = article.with_content(content);
                }
                Some(article)
            })
            .collect()
    }

    async fn fetch_source(&self, source_id: &str) -> Result<Vec<Article>> {
        let from = (Utc::now() - chrono::Duration::days(self.days_back)).format("%Y-%m-%d").to_string();
        let page_size = self.page_size.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("sources", source_id),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: NewsApiResponse = response.json().await?;
        if !status.is_success() || body.status == "error" {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.message.unwrap_or_else(|| "NewsAPI request failed".to_string()),
            });
        }
        Ok(self.convert(body))
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        for source_id in &self.source_ids {
            match self.fetch_source(source_id).await {
                Ok(batch) => {
                    info!("📡 NewsAPI {} returned {} articles", source_id, batch.len());
                    articles.extend(batch);
                }
                Err(e) => error!("NewsAPI {} failed: {}", source_id, e),
            }
        }
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_key() {
        assert!(NewsApiSource::new(None, vec![], 10, 5).is_err());
        assert!(NewsApiSource::new(Some(" ".to_string()), vec![], 10, 5).is_err());
        let source = NewsApiSource::new(Some("secret".to_string()), vec![], 10, 5).unwrap();
        assert!(!format!("{:?}", source).contains("secret"));
    }

    #[test]
    fn test_convert() {
        let body = r#"{
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {
                    "source": {"id": "techcrunch", "name": "TechCrunch"},
                    "author": "Jane Doe",
                    "title": "Kotlin 2.0 ships the K2 compiler",
                    "description": "JetBrains released Kotlin 2.0.",
                    "url": "https://techcrunch.com/kotlin-2",
                    "publishedAt": "2024-05-21T12:00:00Z",
                    "content": "Kotlin 2.0 is out [+1200 chars]"
                },
                {
                    "source": {"id": null, "name": "Removed"},
                    "title": "[Removed]",
                    "url": "https://removed.com"
                },
                {
                    "source": {"id": "wired", "name": "Wired"},
                    "title": "No url"
                }
            ]
        }"#;
        let response: NewsApiResponse = serde_json::from_str(body).unwrap();
        let source = NewsApiSource::new(Some("key".to_string()), vec![], 10, 5).unwrap();
        let articles = source.convert(response);

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.source_name, "TechCrunch");
        assert_eq!(article.authors, vec!["Jane Doe"]);
        assert_eq!(article.description.as_deref(), Some("JetBrains released Kotlin 2.0."));
        assert_eq!(article.published_date.unwrap().to_rfc3339(), "2024-05-21T12:00:00+00:00");
    }
}
