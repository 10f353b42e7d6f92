//! Keyword heuristic used wherever no model can rate an article.

use tn_core::Article;

const TECHNICAL_INDICATORS: &[&str] = &[
    "tutorial", "guide", "how to", "implementation", "deploy", "architecture", "benchmark",
    "performance", "optimization", "deep dive", "code example", "pattern", "best practice",
    "lesson learned", "case study", "analysis", "research", "framework", "library", "algorithm",
    "data structure", "authentication", "authorization", "security", "encryption", "api",
    "microservice", "serverless", "cloud native", "container", "kubernetes", "docker", "ci/cd",
    "devops", "continuous integration", "continuous deployment",
];

const HIGH_VALUE_TOPICS: &[&str] = &[
    "java", "spring", "jvm", "jdk", "openjdk", "spring boot", "kotlin", "scala", "jakarta ee",
    "java ee", "hibernate", "quarkus", "micronaut", "graalvm", "security vulnerability", "cve",
    "critical bug", "major release", "spring security", "java 17", "java 21", "loom",
    "project loom", "virtual threads", "valhalla", "project valhalla", "pattern matching",
    "sealed classes", "records", "memory leak", "performance bottleneck", "garbage collection",
    "profiling", "bytecode", "jit", "compilation", "classloading", "jni", "native interface",
];

const SPECIALIST_SOURCES: &[&str] = &[
    "infoq java", "java code geeks", "baeldung", "spring blog", "inside java", "eclipse blog",
    "jooq blog", "vlad mihalcea", "dzone java", "jetbrains blog",
];

const CRITICAL_EVENTS: &[&str] = &[
    "critical vulnerability", "major release", "java lts", "spring boot 3", "spring framework 6",
    "jakarta ee 10", "java 21", "jdk 22", "virtual threads", "garbage collection improvement",
];

const GENERIC_CONTENT: &[&str] = &[
    "best deals", "sale", "discount", "movie", "show", "top 10", "best of", "review",
    "unboxing", "gaming", "games",
];

/// Number of distinct keywords that occur somewhere in `text`.
fn count_present(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Importance in `[0.0, 1.0]` from keyword presence alone.
pub fn heuristic_score(article: &Article) -> f64 {
    let title = article.title.to_lowercase();
    let text = format!("{} {}", title, article.content.to_lowercase());

    let mut score = 0.5;
    score += (count_present(&text, TECHNICAL_INDICATORS) as f64 * 0.02).min(0.2);
    score += (count_present(&text, HIGH_VALUE_TOPICS) as f64 * 0.04).min(0.4);

    if contains_any(&article.source_name.to_lowercase(), SPECIALIST_SOURCES) {
        score += 0.1;
    }
    if contains_any(&title, HIGH_VALUE_TOPICS) {
        score += 0.1;
    }
    if contains_any(&text, CRITICAL_EVENTS) {
        score += 0.2;
    }
    if count_present(&text, GENERIC_CONTENT) >= 2 {
        score -= 0.2;
    }

    score.clamp(0.0, 1.0)
}
