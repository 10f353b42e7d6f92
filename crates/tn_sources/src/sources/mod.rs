pub mod newsapi;
pub mod rss;

pub use newsapi::NewsApiSource;
pub use rss::RssSource;

use tn_core::{ArticleSource, Result, Settings};

/// Every source the settings enable: the configured feeds, plus NewsAPI when a key is set.
pub fn sources_from_settings(settings: &Settings) -> Result<Vec<Box<dyn ArticleSource>>> {
    let mut sources: Vec<Box<dyn ArticleSource>> = Vec::with_capacity(settings.rss_sources.len() + 1);
    for feed in &settings.rss_sources {
        sources.push(Box::new(RssSource::new(feed, settings.max_articles_per_source)?));
    }

    if let Ok(newsapi) = NewsApiSource::new(
        settings.news_api_key.clone(),
        settings.news_api_sources.clone(),
        settings.max_articles_per_source,
        settings.recent_articles_days,
    ) {
        sources.push(Box::new(newsapi));
    }
    Ok(sources)
}
