use async_trait::async_trait;
use tn_core::{Article, ArticleProcessor, Result};
use tracing::{debug, info};

use crate::scoring::heuristic_score;
use crate::text::{clean_text, significant_words, split_sentences, truncate_summary};

const MIN_TEXT_CHARS: usize = 50;
const LONG_TEXT_CHARS: usize = 1000;
const MIN_SCORED_SENTENCE_CHARS: usize = 30;
const MIN_SUMMARY_CHARS: usize = 20;

/// Rule-based summarizer with no model and no network.
#[derive(Debug, Clone)]
pub struct SimpleSummarizer {
    sentences_count: usize,
}

impl SimpleSummarizer {
    pub fn new(sentences_count: usize) -> Self {
        Self { sentences_count: sentences_count.max(1) }
    }

    pub fn summarize(&self, article: &Article) -> String {
        let fallback = || truncate_summary(&article.title_fallback());

        let text = match article.body_text() {
            Some(text) if text.trim().chars().count() >= MIN_TEXT_CHARS => text,
            _ => return fallback(),
        };
        if text.chars().count() <= 250 {
            return text.to_string();
        }

        let sentences = split_sentences(&clean_text(text));
        if sentences.is_empty() {
            return truncate_summary(text);
        }

        let picked = if text.chars().count() > LONG_TEXT_CHARS {
            self.select_important(&sentences, &article.title)
        } else {
            sentences.iter().take(self.sentences_count).cloned().collect()
        };

        let summary = truncate_summary(&picked.join(" "));
        if summary.trim().chars().count() < MIN_SUMMARY_CHARS {
            return fallback();
        }
        summary
    }

    /// First sentence, the interior sentences sharing most words with the
    /// title, then the last sentence.
    fn select_important(&self, sentences: &[String], title: &str) -> Vec<String> {
        let n = self.sentences_count;
        if sentences.len() <= n {
            return sentences.to_vec();
        }

        let title_words = significant_words(title);
        let mut scored: Vec<(f64, &String)> = sentences[1..sentences.len() - 1]
            .iter()
            .enumerate()
            .map(|(i, sentence)| (i + 1, sentence))
            .filter(|(_, sentence)| sentence.chars().count() >= MIN_SCORED_SENTENCE_CHARS)
            .map(|(position, sentence)| {
                let overlap = significant_words(sentence).intersection(&title_words).count();
                let title_score = overlap as f64 / title_words.len().max(1) as f64;
                let position_score = 1.0 / (position as f64 + 1.0);
                (0.5 * title_score + 0.5 * position_score, sentence)
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut selected = vec![sentences[0].clone()];
        selected.extend(scored.into_iter().take(n.saturating_sub(2)).map(|(_, s)| s.clone()));
        if sentences.len() > 2 {
            selected.push(sentences[sentences.len() - 1].clone());
        }
        selected.truncate(n);
        selected
    }
}

/// Last-resort backend: simple summaries and heuristic scores.
#[derive(Debug, Clone)]
pub struct SimpleProcessor {
    summarizer: SimpleSummarizer,
}

impl SimpleProcessor {
    pub fn new(sentences_count: usize) -> Self {
        Self { summarizer: SimpleSummarizer::new(sentences_count) }
    }
}

#[async_trait]
impl ArticleProcessor for SimpleProcessor {
    fn name(&self) -> &str {
        "Simple"
    }

    async fn process_articles(&self, articles: &mut [Article]) -> Result<()> {
        for article in articles.iter_mut() {
            article.summary = self.summarizer.summarize(article);
            article.importance_score = Some(heuristic_score(article));
            debug!("Simple summary for {}: {:.2}", article.short_title(), article.importance_score.unwrap_or_default());
        }
        info!("📝 Simple processor handled {} articles", articles.len());
        Ok(())
    }
}
