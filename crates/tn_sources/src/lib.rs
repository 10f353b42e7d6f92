pub mod extractor;
pub mod manager;
pub mod sources;

pub use extractor::ContentExtractor;
pub use manager::SourceManager;
pub use sources::{NewsApiSource, RssSource};

pub mod prelude {
    pub use super::extractor::ContentExtractor;
    pub use super::manager::SourceManager;
    pub use super::sources::{NewsApiSource, RssSource};
    pub use tn_core::{Article, ArticleSource, Error, Result};
}
