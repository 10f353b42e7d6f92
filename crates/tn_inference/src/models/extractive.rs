use async_trait::async_trait;
use tn_core::{Article, ArticleProcessor, Error, Result};
use tracing::{debug, info};

use crate::lsa::LsaSummarizer;
use crate::scoring::heuristic_score;
use crate::text::{clean_for_extraction, split_sentences_raw, truncate_summary};
use crate::Config;

const MIN_CONTENT_CHARS: usize = 100;

pub struct ExtractiveSummarizer {
    lsa: LsaSummarizer,
    sentences_count: usize,
}

impl ExtractiveSummarizer {
    pub fn new(sentences_count: usize, reduction_ratio: f64) -> Result<Self> {
        if sentences_count == 0 {
            return Err(Error::Config("extractive summarizer needs at least one sentence".to_string()));
        }
        if !(reduction_ratio > 0.0 && reduction_ratio <= 1.0) {
            return Err(Error::Config(format!("reduction ratio {} is outside (0, 1]", reduction_ratio)));
        }
        Ok(Self {
            lsa: LsaSummarizer::new(reduction_ratio),
            sentences_count,
        })
    }

    pub fn summarize(&self, article: &Article) -> String {
        if article.content.trim().chars().count() < MIN_CONTENT_CHARS {
            return truncate_summary(&format!("{} - No content available for summarization.", article.title));
        }

        let sentences = split_sentences_raw(&clean_for_extraction(&article.content));
        let picked = self.lsa.select(&sentences, self.sentences_count);
        if picked.is_empty() {
            debug!("No rankable sentences in {}", article.short_title());
            return truncate_summary(&article.title_fallback());
        }

        let summary = picked
            .into_iter()
            .map(|i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        truncate_summary(&summary)
    }
}

/// Local backend: LSA summaries and heuristic scores.
pub struct ExtractiveProcessor {
    summarizer: ExtractiveSummarizer,
}

impl ExtractiveProcessor {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            summarizer: ExtractiveSummarizer::new(config.sentences_count, config.reduction_ratio)?,
        })
    }
}

#[async_trait]
impl ArticleProcessor for ExtractiveProcessor {
    fn name(&self) -> &str {
        "Local-Extractive"
    }

    async fn process_articles(&self, articles: &mut [Article]) -> Result<()> {
        for article in articles.iter_mut() {
            article.summary = self.summarizer.summarize(article);
            article.importance_score = Some(heuristic_score(article));
        }
        info!("📚 Extractive summarizer handled {} articles", articles.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "Project Loom delivers virtual threads to the Java platform. \
        Virtual threads are cheap to create and block without tying up an operating system thread. \
        The coffee was fine. \
        Frameworks such as Spring and Quarkus already schedule request handlers on virtual threads. \
        Thread pools sized for blocking calls become unnecessary with virtual threads.";

    #[test]
    fn test_rejects_bad_config() {
        assert!(ExtractiveSummarizer::new(0, 1.0).is_err());
        assert!(ExtractiveSummarizer::new(3, 0.0).is_err());
        assert!(ExtractiveSummarizer::new(3, 1.5).is_err());
    }

    #[test]
    fn test_short_content_message() {
        let summarizer = ExtractiveSummarizer::new(3, 1.0).unwrap();
        let article = Article::new("Loom", "https://a.example/1", "Feed").with_content("Short body.");
        assert_eq!(summarizer.summarize(&article), "Loom - No content available for summarization.");
    }

    #[test]
    fn test_summary_keeps_document_order() {
        let summarizer = ExtractiveSummarizer::new(2, 1.0).unwrap();
        let article = Article::new("Loom", "https://a.example/1", "Feed").with_content(CONTENT);
        let summary = summarizer.summarize(&article);
        assert!(summary.chars().count() <= 250);
        assert!(!summary.contains("coffee"));

        let sentences = split_sentences_raw(CONTENT);
        let positions: Vec<usize> = sentences
            .iter()
            .filter_map(|s| summary.find(s.as_str()))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_stop_word_only_content_falls_back() {
        let summarizer = ExtractiveSummarizer::new(3, 1.0).unwrap();
        let content = "It is what it is and that is that. ".repeat(5);
        let article = Article::new("Nothing", "https://a.example/2", "Feed").with_content(content);
        assert_eq!(summarizer.summarize(&article), "Nothing - From Feed");
    }

    #[tokio::test]
    async fn test_processor_scores_every_article() {
        let processor = ExtractiveProcessor::new(&Config::default()).unwrap();
        let mut articles = vec![
            Article::new("Java 21 Released with Virtual Threads", "https://a.example/3", "Inside Java").with_content(CONTENT),
            Article::new("Empty", "https://a.example/4", "Feed"),
        ];
        processor.process_articles(&mut articles).await.unwrap();
        assert!(articles.iter().all(|a| !a.summary.is_empty()));
        assert!(articles.iter().all(|a| a.importance_score.is_some()));
    }
}
