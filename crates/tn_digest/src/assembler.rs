use std::cmp::Ordering;

use tn_core::Article;
use tracing::info;

/// Picks the articles that make it into a digest.
#[derive(Debug, Clone, Copy)]
pub struct DigestAssembler {
    pub min_score: f64,
    pub top_n: usize,
}

impl DigestAssembler {
    pub fn new(min_score: f64, top_n: usize) -> Self {
        Self { min_score, top_n }
    }

    /// Scored batches: articles at or above the threshold, best first.
    /// Unscored batches: everything, newest first with undated last.
    pub fn assemble<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        let any_scored = articles.iter().any(|a| a.importance_score.is_some());

        let mut selected: Vec<&Article> = if any_scored {
            let mut kept: Vec<&Article> = articles
                .iter()
                .filter(|a| a.importance_score.map_or(false, |s| s >= self.min_score))
                .collect();
            kept.sort_by(|a, b| {
                b.importance_score
                    .partial_cmp(&a.importance_score)
                    .unwrap_or(Ordering::Equal)
            });
            kept
        } else {
            let mut all: Vec<&Article> = articles.iter().collect();
            all.sort_by(|a, b| match (a.published_date, b.published_date) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
            all
        };

        selected.truncate(self.top_n);
        info!("🗞️ Digest holds {} of {} articles", selected.len(), articles.len());
        selected
    }
}
