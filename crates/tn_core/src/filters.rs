use std::collections::HashSet;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::types::Article;

/// Titles at least this similar are treated as the same story.
pub const DUPLICATE_THRESHOLD: f64 = 0.8;

pub const PRIMARY_KEYWORDS: &[&str] = &[
    "java", "jdk", "jvm", "spring", "kotlin", "scala", "openjdk", "jakarta ee", "java ee",
    "spring boot", "hibernate", "quarkus", "micronaut", "graalvm", "jetbrains", "intellij",
    "jboss", "tomcat", "maven", "gradle", "javafx", "eclipse",
];

pub const SECONDARY_KEYWORDS: &[&str] = &[
    "microservices", "reactive", "rest api", "graphql", "jpa", "jdbc", "orm",
    "dependency injection", "bytecode", "jit compiler", "garbage collection",
    "java virtual machine", "jni", "jms", "cloud native", "serverless", "containers",
    "kubernetes", "docker", "ci/cd", "devops", "jenkins", "apache", "wildfly", "weblogic",
    "websphere", "netty", "vert.x", "helidon", "spring cloud", "spring security",
    "spring data", "jakarta", "jee", "j2ee", "jaxrs", "jaxb", "junit", "mockito", "testng",
];

pub const EXCLUDED_KEYWORDS: &[&str] = &[
    "amazon sale", "amazon prime", "best deals", "spring sale", "spring shopping", "movie",
    "tv show", "subscription", "discount", "coupon", "elon musk", "shopping", "prime day",
    "best buy", "apple tv", "netflix", "ps5", "xbox", "iphone", "android phone", "deal",
    "wired", "best gadgets",
];

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"https?://\S+").unwrap();
}

/// Lowercased title with URLs and punctuation removed and whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    let without_urls = URL_RE.replace_all(title, " ").to_lowercase();
    let kept: String = without_urls
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Word-set Jaccard similarity of two normalized titles.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

/// Drop articles whose title duplicates an earlier one. The first occurrence wins.
pub fn deduplicate(articles: Vec<Article>) -> Vec<Article> {
    let total = articles.len();
    let mut kept_titles: Vec<String> = Vec::with_capacity(total);
    let mut kept = Vec::with_capacity(total);

    for article in articles {
        let normalized = normalize_title(&article.title);
        let duplicate = kept_titles
            .iter()
            .any(|seen| *seen == normalized || jaccard_similarity(seen, &normalized) >= DUPLICATE_THRESHOLD);
        if duplicate {
            debug!("Dropping duplicate: {}", article.short_title());
            continue;
        }
        kept_titles.push(normalized);
        kept.push(article);
    }

    info!("🧹 Deduplicated {} articles down to {}", total, kept.len());
    kept
}

pub fn filter_recent(articles: Vec<Article>, days: i64) -> Vec<Article> {
    filter_recent_at(articles, Utc::now(), days)
}

pub fn filter_recent_at(articles: Vec<Article>, now: DateTime<Utc>, days: i64) -> Vec<Article> {
    let total = articles.len();
    let recent: Vec<Article> = articles
        .into_iter()
        .filter(|a| a.is_recent_at(now, days))
        .collect();
    info!("📅 {} of {} articles are from the last {} days", recent.len(), total, days);
    recent
}

fn count_keywords(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

/// Whether the article is about the JVM ecosystem and not consumer noise.
pub fn is_relevant(article: &Article) -> bool {
    let text = format!("{} {}", article.title, article.content).to_lowercase();
    let primary = count_keywords(&text, PRIMARY_KEYWORDS);
    let secondary = count_keywords(&text, SECONDARY_KEYWORDS);
    let excluded = count_keywords(&text, EXCLUDED_KEYWORDS);
    (primary >= 1 || secondary >= 3) && excluded < 2
}

pub fn filter_relevant(articles: Vec<Article>) -> Vec<Article> {
    let total = articles.len();
    let relevant: Vec<Article> = articles.into_iter().filter(is_relevant).collect();
    info!("🎯 {} of {} articles are relevant", relevant.len(), total);
    relevant
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn article(title: &str, content: &str) -> Article {
        Article::new(title, format!("https://news.example/{}", title.len()), "Feed").with_content(content)
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(
            normalize_title("  Spring Boot 3.2: What's New? https://spring.io/x  "),
            "spring boot 32 whats new"
        );
    }

    #[test]
    fn test_jaccard_similarity() {
        assert_eq!(jaccard_similarity("a b c d", "a b c d"), 1.0);
        assert_eq!(jaccard_similarity("a b", "c d"), 0.0);
        assert_eq!(jaccard_similarity("", ""), 0.0);
        assert!((jaccard_similarity("a b c d e", "a b c d") - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_deduplicate_keeps_first() {
        let articles = vec![
            article("Java 21 Released With Virtual Threads Support", "first"),
            article("Java 21 released with virtual threads support!", "second"),
            article("Kotlin 2.0 brings the K2 compiler", "third"),
        ];
        let unique = deduplicate(articles);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].content, "first");
        assert_eq!(unique[1].content, "third");
    }

    #[test]
    fn test_filter_recent_drops_old_and_undated() {
        let now = Utc::now();
        let articles = vec![
            article("fresh", "").with_published_date(now - Duration::days(2)),
            article("stale", "").with_published_date(now - Duration::days(30)),
            article("undated", ""),
        ];
        let recent = filter_recent_at(articles, now, 5);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title, "fresh");
    }

    #[test]
    fn test_filter_relevant() {
        let articles = vec![
            article("Spring Boot 3.2 released", "Faster startup."),
            article("Scaling services", "kubernetes, docker and serverless patterns"),
            article("Best deals on the iPhone", "A discount on java cups"),
            article("New movie trailer", "Nothing about code."),
        ];
        let relevant = filter_relevant(articles);
        let titles: Vec<&str> = relevant.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Spring Boot 3.2 released", "Scaling services"]);
    }
}
