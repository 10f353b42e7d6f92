use std::sync::Arc;
use std::time::Duration;

use lazy_static::lazy_static;
use reqwest::Client;
use scraper::{Html, Selector};
use tn_core::{Article, Error, Result};
use tracing::{debug, info, warn};
use url::Url;

pub const CRAWLER_USER_AGENT: &str = "Mozilla/5.0 (compatible; TechNewsDigest/1.0; +https://github.com/tech-news-digest)";

/// Sites that reject automated fetches or sit behind paywalls.
const BLOCKED_DOMAINS: &[&str] = &["wsj.com", "nytimes.com", "bloomberg.com", "medium.com", "ft.com"];

/// Content this long is kept as is.
const ENOUGH_CONTENT_CHARS: usize = 500;

lazy_static! {
    static ref ARTICLE_PARAGRAPHS: Selector = Selector::parse("article p").unwrap();
    static ref PARAGRAPHS: Selector = Selector::parse("p").unwrap();
}

/// Plain text of an HTML fragment with whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Body paragraphs of a full page: those inside `<article>`, else every `<p>`.
pub fn extract_from_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let collect = |selector: &Selector| {
        document
            .select(selector)
            .map(|p| p.text().collect::<Vec<_>>().join(" "))
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
    };

    let mut paragraphs = collect(&ARTICLE_PARAGRAPHS);
    if paragraphs.is_empty() {
        paragraphs = collect(&PARAGRAPHS);
    }
    paragraphs.join("\n\n")
}

/// Fetches article pages to replace thin feed content with the full text.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    client: Arc<Client>,
    delay: Duration,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(CRAWLER_USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client: Arc::new(client),
            delay: Duration::from_secs(1),
        })
    }

    /// Pause between page fetches.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn is_blocked(url: &str) -> bool {
        let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
            Some(host) => host,
            None => return true,
        };
        BLOCKED_DOMAINS
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Source(format!("{} answered {}", url, status)));
        }
        Ok(extract_from_html(&response.text().await?))
    }

    /// Full text of the page, or an empty string when it cannot be had.
    pub async fn extract(&self, url: &str) -> String {
        if Self::is_blocked(url) {
            debug!("Skipping blocked domain: {}", url);
            return String::new();
        }
        match self.fetch(url).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Content extraction failed for {}: {}", url, e);
                String::new()
            }
        }
    }

    /// Replace short content with the extracted page text when that is longer.
    pub async fn enhance(&self, articles: &mut [Article]) {
        let mut enhanced = 0;
        for article in articles.iter_mut() {
            if article.content.chars().count() >= ENOUGH_CONTENT_CHARS {
                continue;
            }
            let text = self.extract(&article.url).await;
            if text.chars().count() > article.content.chars().count() {
                article.content = text;
                enhanced += 1;
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
        info!("🕸️ Enhanced content of {} of {} articles", enhanced, articles.len());
    }
}
