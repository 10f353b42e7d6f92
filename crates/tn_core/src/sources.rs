use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the latest articles the source exposes.
    async fn fetch_articles(&self) -> Result<Vec<Article>>;
}
