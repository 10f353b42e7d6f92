use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tn_core::{Article, ArticleProcessor, Error, Result};
use tn_inference::adaptive::{AdaptiveProcessor, Tier};
use tn_inference::models::SimpleProcessor;

#[derive(Clone, Copy)]
enum Behavior {
    Succeed(Option<f64>),
    RateLimited,
    Broken,
    /// Writes the first `n` articles, then gives up on the batch.
    FailAfter(usize),
}

struct MockProcessor {
    name: &'static str,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl MockProcessor {
    fn new(name: &'static str, behavior: Behavior) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self { name, behavior, calls: calls.clone() }, calls)
    }

    fn write(&self, article: &mut Article, score: Option<f64>) {
        article.summary = format!("{} summary of {}", self.name, article.title);
        article.importance_score = score;
    }
}

#[async_trait]
impl ArticleProcessor for MockProcessor {
    fn name(&self) -> &str {
        self.name
    }

    async fn process_articles(&self, articles: &mut [Article]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed(score) => {
                for article in articles.iter_mut() {
                    self.write(article, score);
                }
                Ok(())
            }
            Behavior::RateLimited => Err(Error::RateLimited("429 from upstream".to_string())),
            Behavior::Broken => Err(Error::Inference("model crashed".to_string())),
            Behavior::FailAfter(n) => {
                for article in articles.iter_mut().take(n) {
                    self.write(article, Some(0.99));
                }
                Err(Error::Api { status: 500, message: "stream reset".to_string() })
            }
        }
    }
}

fn batch() -> Vec<Article> {
    (0..4)
        .map(|i| {
            Article::new(format!("Article {}", i), format!("https://news.example/{}", i), "Inside Java")
                .with_content(format!("Body of article {} about the JVM.", i))
        })
        .collect()
}

fn urls(articles: &[Article]) -> Vec<String> {
    articles.iter().map(|a| a.url.clone()).collect()
}

fn assert_complete(articles: &[Article]) {
    for article in articles {
        assert!(!article.summary.is_empty(), "empty summary for {}", article.title);
        let score = article.importance_score.expect("score missing");
        assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }
}

#[tokio::test]
async fn test_first_tier_success_short_circuits() {
    let (local, local_calls) = MockProcessor::new("Local-Host-LLM", Behavior::Succeed(Some(0.9)));
    let (cloud, cloud_calls) = MockProcessor::new("Cloud-LLM", Behavior::Succeed(Some(0.1)));
    let (extractive, extractive_calls) = MockProcessor::new("Local-Extractive", Behavior::Succeed(Some(0.2)));
    let (simple, simple_calls) = MockProcessor::new("Simple", Behavior::Succeed(Some(0.3)));

    let processor = AdaptiveProcessor::with_tiers(vec![
        Tier::new(Box::new(local)),
        Tier::new(Box::new(cloud)).without_score_normalization(),
        Tier::new(Box::new(extractive)),
        Tier::new(Box::new(simple)),
    ]);

    let input = batch();
    let expected_urls = urls(&input);
    let output = processor.process_articles(input).await;

    assert_eq!(urls(&output), expected_urls);
    assert_complete(&output);
    assert!(output.iter().all(|a| a.summary.starts_with("Local-Host-LLM summary")));
    assert!(output.iter().all(|a| a.importance_score == Some(0.9)));
    assert_eq!(local_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cloud_calls.load(Ordering::SeqCst), 0);
    assert_eq!(extractive_calls.load(Ordering::SeqCst), 0);
    assert_eq!(simple_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_falls_through_to_next_tier() {
    let (local, local_calls) = MockProcessor::new("Local-Host-LLM", Behavior::Broken);
    let (cloud, cloud_calls) = MockProcessor::new("Cloud-LLM", Behavior::Succeed(Some(0.8)));
    let (extractive, extractive_calls) = MockProcessor::new("Local-Extractive", Behavior::Succeed(Some(0.2)));
    let (simple, simple_calls) = MockProcessor::new("Simple", Behavior::Succeed(Some(0.3)));

    let processor = AdaptiveProcessor::with_tiers(vec![
        Tier::new(Box::new(local)),
        Tier::new(Box::new(cloud)).without_score_normalization(),
        Tier::new(Box::new(extractive)),
        Tier::new(Box::new(simple)),
    ]);

    let output = processor.process_articles(batch()).await;

    assert_complete(&output);
    assert!(output.iter().all(|a| a.summary.starts_with("Cloud-LLM summary")));
    assert_eq!(local_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cloud_calls.load(Ordering::SeqCst), 1);
    assert_eq!(extractive_calls.load(Ordering::SeqCst), 0);
    assert_eq!(simple_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rate_limit_falls_through() {
    let (cloud, _) = MockProcessor::new("Cloud-LLM", Behavior::RateLimited);
    let (simple, simple_calls) = MockProcessor::new("Simple", Behavior::Succeed(Some(0.4)));

    let processor = AdaptiveProcessor::with_tiers(vec![
        Tier::new(Box::new(cloud)).without_score_normalization(),
        Tier::new(Box::new(simple)),
    ]);

    let output = processor.process_articles(batch()).await;
    assert_eq!(simple_calls.load(Ordering::SeqCst), 1);
    assert!(output.iter().all(|a| a.summary.starts_with("Simple summary")));
}

#[tokio::test]
async fn test_partial_writes_are_overwritten() {
    let (local, _) = MockProcessor::new("Local-Host-LLM", Behavior::FailAfter(2));
    let (simple, _) = MockProcessor::new("Simple", Behavior::Succeed(Some(0.4)));

    let processor = AdaptiveProcessor::with_tiers(vec![Tier::new(Box::new(local)), Tier::new(Box::new(simple))]);

    let output = processor.process_articles(batch()).await;
    assert!(output.iter().all(|a| a.summary.starts_with("Simple summary")));
    assert!(output.iter().all(|a| a.importance_score == Some(0.4)));
}

#[tokio::test]
async fn test_normalizing_tier_replaces_missing_scores() {
    let (extractive, _) = MockProcessor::new("Local-Extractive", Behavior::Succeed(None));
    let processor = AdaptiveProcessor::with_tiers(vec![Tier::new(Box::new(extractive))]);

    let output = processor.process_articles(batch()).await;
    assert!(output.iter().all(|a| a.importance_score == Some(0.7)));

    let (extractive, _) = MockProcessor::new("Local-Extractive", Behavior::Succeed(Some(0.0)));
    let processor = AdaptiveProcessor::with_tiers(vec![Tier::new(Box::new(extractive))]);

    let output = processor.process_articles(batch()).await;
    assert!(output.iter().all(|a| a.importance_score == Some(0.7)));
}

#[tokio::test]
async fn test_cloud_scores_are_not_normalized() {
    let (cloud, _) = MockProcessor::new("Cloud-LLM", Behavior::Succeed(Some(0.0)));
    let processor =
        AdaptiveProcessor::with_tiers(vec![Tier::new(Box::new(cloud)).without_score_normalization()]);
    let output = processor.process_articles(batch()).await;
    assert!(output.iter().all(|a| a.importance_score == Some(0.0)));

    // A missing score is still filled by the final sweep.
    let (cloud, _) = MockProcessor::new("Cloud-LLM", Behavior::Succeed(None));
    let processor =
        AdaptiveProcessor::with_tiers(vec![Tier::new(Box::new(cloud)).without_score_normalization()]);
    let output = processor.process_articles(batch()).await;
    assert!(output.iter().all(|a| a.importance_score == Some(0.7)));
}

#[tokio::test]
async fn test_terminal_fallback_when_every_tier_fails() {
    let (local, _) = MockProcessor::new("Local-Host-LLM", Behavior::Broken);
    let (simple, _) = MockProcessor::new("Simple", Behavior::Broken);
    let processor = AdaptiveProcessor::with_tiers(vec![Tier::new(Box::new(local)), Tier::new(Box::new(simple))]);

    let output = processor.process_articles(batch()).await;
    assert_eq!(output.len(), 4);
    for article in &output {
        assert_eq!(article.summary, format!("{} - From Inside Java", article.title));
        assert_eq!(article.importance_score, Some(0.6));
    }
}

#[tokio::test]
async fn test_real_simple_tier_after_failure() {
    let (local, _) = MockProcessor::new("Local-Host-LLM", Behavior::RateLimited);
    let processor = AdaptiveProcessor::with_tiers(vec![
        Tier::new(Box::new(local)),
        Tier::new(Box::new(SimpleProcessor::new(3))),
    ]);

    let articles = vec![
        Article::new("Java 21 Released with Virtual Threads", "https://news.example/java21", "Inside Java"),
        Article::new("Weekend picks", "https://news.example/deals", "Gadget Site")
            .with_content("The best deals of the week: a big sale on every movie ticket, plus more."),
    ];
    let output = processor.process_articles(articles).await;

    assert_complete(&output);
    assert_eq!(output[0].summary, "Java 21 Released with Virtual Threads - From Inside Java");
    assert!(output[0].importance_score.unwrap() >= 0.64);
    assert!(output[1].importance_score.unwrap() <= 0.3);
}

#[tokio::test]
async fn test_adaptive_is_an_article_processor() {
    let (simple, _) = MockProcessor::new("Simple", Behavior::Succeed(Some(0.5)));
    let adaptive: Box<dyn ArticleProcessor> =
        Box::new(AdaptiveProcessor::with_tiers(vec![Tier::new(Box::new(simple))]));

    let mut articles = batch();
    adaptive.process_articles(&mut articles).await.unwrap();
    assert_eq!(adaptive.name(), "Adaptive");
    assert_complete(&articles);
}
