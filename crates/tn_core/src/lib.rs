pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod sources;
pub mod types;

pub use config::{EmailSettings, FeedSource, Settings};
pub use error::Error;
pub use models::ArticleProcessor;
pub use sources::ArticleSource;
pub use types::Article;

pub type Result<T> = std::result::Result<T, Error>;
