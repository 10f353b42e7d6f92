use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "deepseek-r1:7b";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_NEWS_API_SOURCES: &[&str] = &["the-verge", "wired", "techcrunch", "ars-technica", "hacker-news"];

const DEFAULT_RSS_SOURCES: &[(&str, &str)] = &[
    ("InfoQ Java", "https://feed.infoq.com/java/"),
    ("Java Code Geeks", "https://www.javacodegeeks.com/feed"),
    ("Baeldung", "https://www.baeldung.com/feed/"),
    ("Spring Blog", "https://spring.io/blog.atom"),
    ("Eclipse Blog", "https://blogs.eclipse.org/blog/feed"),
    ("Inside Java", "https://inside.java/feed.xml"),
    ("jOOQ Blog", "https://blog.jooq.org/feed/"),
    ("Vlad Mihalcea's Blog", "https://vladmihalcea.com/feed/"),
    ("DZone Java", "https://feeds.dzone.com/java"),
    ("JetBrains Blog", "https://blog.jetbrains.com/feed/"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into() }
    }
}

#[derive(Clone)]
pub struct EmailSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub recipients: Vec<String>,
    pub sender_email: Option<String>,
    pub sender_name: String,
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_deref().map(|_| "<redacted>"))
            .field("recipients", &self.recipients)
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .finish()
    }
}

/// Runtime settings, read from the environment (and `.env` when the binary loads one).
#[derive(Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub news_api_key: Option<String>,
    pub news_api_sources: Vec<String>,
    pub enable_ollama: bool,
    pub ollama_host: String,
    pub ollama_model: String,
    pub email: EmailSettings,
    pub rss_sources: Vec<FeedSource>,
    pub max_articles_per_source: usize,
    pub top_articles_in_digest: usize,
    pub min_importance_score: f64,
    pub recent_articles_days: i64,
    pub schedule_interval_hours: u64,
    pub enable_web_crawling: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("openai_api_key", &self.openai_api_key.as_deref().map(|_| "<redacted>"))
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("news_api_key", &self.news_api_key.as_deref().map(|_| "<redacted>"))
            .field("news_api_sources", &self.news_api_sources)
            .field("enable_ollama", &self.enable_ollama)
            .field("ollama_host", &self.ollama_host)
            .field("ollama_model", &self.ollama_model)
            .field("email", &self.email)
            .field("rss_sources", &self.rss_sources.len())
            .field("max_articles_per_source", &self.max_articles_per_source)
            .field("top_articles_in_digest", &self.top_articles_in_digest)
            .field("min_importance_score", &self.min_importance_score)
            .field("recent_articles_days", &self.recent_articles_days)
            .field("schedule_interval_hours", &self.schedule_interval_hours)
            .field("enable_web_crawling", &self.enable_web_crawling)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let rss_sources = match get("RSS_FEEDS") {
            Some(raw) => parse_feeds(&raw)?,
            None => DEFAULT_RSS_SOURCES
                .iter()
                .map(|(name, url)| FeedSource::new(*name, *url))
                .collect(),
        };

        let news_api_sources = match get("NEWS_API_SOURCES") {
            Some(raw) => split_list(&raw),
            None => DEFAULT_NEWS_API_SOURCES.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            news_api_key: get("NEWS_API_KEY"),
            news_api_sources,
            enable_ollama: parse_bool("ENABLE_OLLAMA", get("ENABLE_OLLAMA"), true)?,
            ollama_host: get("OLLAMA_HOST").unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
            ollama_model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            email: EmailSettings {
                host: get("EMAIL_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: parse_value("EMAIL_PORT", get("EMAIL_PORT"), 587)?,
                username: get("EMAIL_USERNAME"),
                password: get("EMAIL_PASSWORD"),
                recipients: get("EMAIL_RECIPIENTS").map(|r| split_list(&r)).unwrap_or_default(),
                sender_email: get("SENDER_EMAIL"),
                sender_name: get("SENDER_NAME").unwrap_or_else(|| "JVM Tech News Digest".to_string()),
            },
            rss_sources,
            max_articles_per_source: parse_value("MAX_ARTICLES_PER_SOURCE", get("MAX_ARTICLES_PER_SOURCE"), 10)?,
            top_articles_in_digest: parse_value("TOP_ARTICLES_IN_DIGEST", get("TOP_ARTICLES_IN_DIGEST"), 6)?,
            min_importance_score: parse_value("MIN_IMPORTANCE_SCORE", get("MIN_IMPORTANCE_SCORE"), 0.45)?,
            recent_articles_days: parse_value("RECENT_ARTICLES_DAYS", get("RECENT_ARTICLES_DAYS"), 5)?,
            schedule_interval_hours: parse_value("SCHEDULE_INTERVAL_HOURS", get("SCHEDULE_INTERVAL_HOURS"), 12)?,
            enable_web_crawling: parse_bool("ENABLE_WEB_CRAWLING", get("ENABLE_WEB_CRAWLING"), false)?,
        })
    }

    /// Key/value view for display with secrets masked.
    pub fn masked(&self) -> Vec<(&'static str, String)> {
        let secret = |value: &Option<String>| value.as_deref().map(mask).unwrap_or_else(|| "<not set>".to_string());
        let plain = |value: &Option<String>| value.clone().unwrap_or_else(|| "<not set>".to_string());

        vec![
            ("OPENAI_API_KEY", secret(&self.openai_api_key)),
            ("OPENAI_MODEL", self.openai_model.clone()),
            ("OPENAI_BASE_URL", self.openai_base_url.clone()),
            ("NEWS_API_KEY", secret(&self.news_api_key)),
            ("ENABLE_OLLAMA", self.enable_ollama.to_string()),
            ("OLLAMA_HOST", self.ollama_host.clone()),
            ("OLLAMA_MODEL", self.ollama_model.clone()),
            ("EMAIL_HOST", self.email.host.clone()),
            ("EMAIL_PORT", self.email.port.to_string()),
            ("EMAIL_USERNAME", plain(&self.email.username)),
            ("EMAIL_PASSWORD", secret(&self.email.password)),
            ("EMAIL_RECIPIENTS", self.email.recipients.join(", ")),
            ("SENDER_EMAIL", plain(&self.email.sender_email)),
            ("SENDER_NAME", self.email.sender_name.clone()),
            ("RSS_FEEDS", format!("{} feeds", self.rss_sources.len())),
            ("MAX_ARTICLES_PER_SOURCE", self.max_articles_per_source.to_string()),
            ("TOP_ARTICLES_IN_DIGEST", self.top_articles_in_digest.to_string()),
            ("MIN_IMPORTANCE_SCORE", self.min_importance_score.to_string()),
            ("RECENT_ARTICLES_DAYS", self.recent_articles_days.to_string()),
            ("SCHEDULE_INTERVAL_HOURS", self.schedule_interval_hours.to_string()),
            ("ENABLE_WEB_CRAWLING", self.enable_web_crawling.to_string()),
        ]
    }
}

/// First and last character kept, everything between starred out.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let mut masked = String::with_capacity(chars.len());
    masked.push(chars[0]);
    masked.extend(std::iter::repeat('*').take(chars.len() - 2));
    masked.push(chars[chars.len() - 1]);
    masked
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `Name|url` pairs separated by commas.
fn parse_feeds(raw: &str) -> Result<Vec<FeedSource>> {
    split_list(raw)
        .into_iter()
        .map(|entry| match entry.split_once('|') {
            Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => {
                Ok(FeedSource::new(name.trim(), url.trim()))
            }
            _ => Err(Error::Config(format!("RSS_FEEDS entry '{}' is not of the form Name|url", entry))),
        })
        .collect()
}

fn parse_value<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: Option<String>, default: bool) -> Result<bool> {
    match raw.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes" | "on") => Ok(true),
        Some("false" | "0" | "no" | "off") => Ok(false),
        Some(other) => Err(Error::Config(format!("{} is not a boolean: {}", key, other))),
    }
}
