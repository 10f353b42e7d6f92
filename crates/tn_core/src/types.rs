use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of any summary handed to the digest.
pub const SUMMARY_MAX_CHARS: usize = 250;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source_name: String,
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub importance_score: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source_name: source_name.into(),
            published_date: None,
            authors: Vec::new(),
            content: String::new(),
            description: None,
            summary: String::new(),
            importance_score: None,
            categories: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_published_date(mut self, date: DateTime<Utc>) -> Self {
        self.published_date = Some(date);
        self
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// The best body text available: full content, then the feed description.
    pub fn body_text(&self) -> Option<&str> {
        if !self.content.trim().is_empty() {
            return Some(&self.content);
        }
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Summary used when no backend produced anything better.
    pub fn title_fallback(&self) -> String {
        format!("{} - From {}", self.title, self.source_name)
    }

    /// Title shortened for log lines.
    pub fn short_title(&self) -> &str {
        match self.title.char_indices().nth(40) {
            Some((idx, _)) => &self.title[..idx],
            None => &self.title,
        }
    }

    /// Whether the article was published within the last `days` days.
    pub fn is_recent(&self, days: i64) -> bool {
        self.is_recent_at(Utc::now(), days)
    }

    /// Undated articles never count as recent.
    pub fn is_recent_at(&self, now: DateTime<Utc>, days: i64) -> bool {
        self.published_date
            .map(|date| date >= now - Duration::days(days))
            .unwrap_or(false)
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.source_name)
    }
}
