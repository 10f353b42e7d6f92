use std::fmt::Write;

use chrono::{DateTime, Utc};
use tn_core::Article;

const PLACEHOLDER_SUMMARY: &str = "View the full article for details";
const FOOTER: &str = "This digest was automatically generated by Tech News Digest.";

/// Summary fit for a reader: reasoning traces and blanks are replaced.
pub fn display_summary(article: &Article) -> &str {
    if article.summary.trim().is_empty() || article.summary.contains("<think>") {
        PLACEHOLDER_SUMMARY
    } else {
        &article.summary
    }
}

fn published(article: &Article) -> String {
    article
        .published_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown date".to_string())
}

fn importance(article: &Article, precision: usize) -> String {
    article
        .importance_score
        .map(|s| format!("{:.*}", precision, s))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_console(articles: &[&Article], now: DateTime<Utc>) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "TECH NEWS DIGEST - {}", now.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "{}", rule);

    if articles.is_empty() {
        let _ = writeln!(out, "\nNo articles made it into the digest.");
    }
    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {}", i + 1, article.title);
        let _ = writeln!(out, "   Source: {} | Importance: {}", article.source_name, importance(article, 2));
        let _ = writeln!(out, "   URL: {}", article.url);
        let _ = writeln!(out, "   Summary: {}", article.summary);
    }
    let _ = writeln!(out, "\n{}", rule);
    out
}

pub fn render_text(articles: &[&Article], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "JVM TECH NEWS DIGEST - {}", now.format("%A, %B %d, %Y"));
    let _ = writeln!(out, "{}\n", "=".repeat(70));

    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, article.title);
        let _ = writeln!(out, "   Source: {}", article.source_name);
        let _ = writeln!(out, "   Published: {}", published(article));
        let _ = writeln!(out, "   Importance: {}", importance(article, 1));
        let _ = writeln!(out, "   URL: {}", article.url);
        let _ = writeln!(out, "   Summary: {}\n", display_summary(article));
        let _ = writeln!(out, "{}\n", "-".repeat(50));
    }

    let _ = writeln!(out, "\n{}", FOOTER);
    out
}

pub fn render_html(articles: &[&Article], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html>
<head>
    <title>JVM Tech News Digest</title>
</head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <div style="background-color: #0078d4; color: white; padding: 20px; text-align: center;">
        <h1>JVM Tech News Digest</h1>
        <p>{}</p>
    </div>
    <div style="padding: 20px;">
"#,
        now.format("%A, %B %d, %Y")
    );

    for (i, article) in articles.iter().enumerate() {
        let _ = write!(
            out,
            r#"        <div style="margin-bottom: 25px; padding-bottom: 15px; border-bottom: 1px solid #eee;">
            <h2 style="color: #0078d4; margin-bottom: 5px;">
                {}. <a href="{}" style="color: #0078d4;">{}</a>
            </h2>
            <div style="color: #666; font-size: 0.9em; margin-bottom: 10px;">
                <strong>Source:</strong> {} |
                <strong>Published:</strong> {} |
                <strong>Importance:</strong> {}
            </div>
            <p>{}</p>
        </div>
"#,
            i + 1,
            escape_html(&article.url),
            escape_html(&article.title),
            escape_html(&article.source_name),
            published(article),
            importance(article, 1),
            escape_html(display_summary(article)),
        );
    }

    let _ = write!(
        out,
        r#"    </div>
    <div style="background-color: #f4f4f4; padding: 15px; text-align: center; font-size: 0.8em; color: #666;">
        <p>{}</p>
    </div>
</body>
</html>
"#,
        FOOTER
    );
    out
}
