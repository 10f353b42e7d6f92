use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

/// A summarization backend that fills in `summary` and `importance_score`
/// for a whole batch of articles.
#[async_trait]
pub trait ArticleProcessor: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Process the batch in place. An `Err` means the batch as a whole was
    /// abandoned and any values already written may be overwritten by the caller.
    async fn process_articles(&self, articles: &mut [Article]) -> Result<()>;
}
