use std::fmt;

use chrono::{DateTime, Utc};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tn_core::{Article, EmailSettings, Error, Result};
use tracing::{info, warn};

use crate::render::{render_html, render_text};

const IMPLICIT_TLS_PORT: u16 = 465;

/// Delivers digests over SMTP.
pub struct EmailSender {
    host: String,
    port: u16,
    username: String,
    password: String,
    recipients: Vec<Mailbox>,
    from: Mailbox,
}

impl fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSender")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients.len())
            .finish()
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox> {
    raw.parse::<Mailbox>()
        .map_err(|e| Error::Config(format!("invalid email address '{}': {}", raw, e)))
}

impl EmailSender {
    /// Requires host, credentials and at least one recipient. The sender
    /// address defaults to the SMTP username.
    pub fn from_settings(settings: &EmailSettings) -> Result<Self> {
        let (username, password) = match (&settings.username, &settings.password) {
            (Some(u), Some(p)) if !settings.host.is_empty() && settings.port != 0 => (u.clone(), p.clone()),
            _ => return Err(Error::Config("Email configuration is incomplete".to_string())),
        };
        if settings.recipients.is_empty() {
            return Err(Error::Config("No email recipients specified".to_string()));
        }

        let recipients = settings
            .recipients
            .iter()
            .map(|r| parse_mailbox(r))
            .collect::<Result<Vec<_>>>()?;
        let sender_email = settings.sender_email.clone().unwrap_or_else(|| username.clone());
        let from = parse_mailbox(&format!("{} <{}>", settings.sender_name, sender_email))?;

        Ok(Self {
            host: settings.host.clone(),
            port: settings.port,
            username,
            password,
            recipients,
            from,
        })
    }

    pub fn subject(now: DateTime<Utc>) -> String {
        format!("JVM Tech News Digest - {}", now.format("%Y-%m-%d"))
    }

    /// Multipart message with the plain text body first and the HTML body second.
    pub fn build_message(&self, articles: &[&Article], now: DateTime<Utc>) -> Result<Message> {
        let mut builder = Message::builder().from(self.from.clone()).subject(Self::subject(now));
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }
        builder
            .multipart(MultiPart::alternative_plain_html(
                render_text(articles, now),
                render_html(articles, now),
            ))
            .map_err(|e| Error::Delivery(format!("could not build message: {}", e)))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if self.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
        }
        .map_err(|e| Error::Delivery(format!("SMTP setup for {} failed: {}", self.host, e)))?;

        Ok(builder
            .port(self.port)
            .credentials(Credentials::new(self.username.clone(), self.password.clone()))
            .build())
    }

    /// Send the digest. An empty digest is not sent and reports `false`.
    pub async fn send_digest(&self, articles: &[&Article]) -> Result<bool> {
        if articles.is_empty() {
            warn!("No articles provided for digest email");
            return Ok(false);
        }

        let message = self.build_message(articles, Utc::now())?;
        info!("📧 Sending digest via {}:{} to {} recipients", self.host, self.port, self.recipients.len());
        self.transport()?
            .send(message)
            .await
            .map_err(|e| Error::Delivery(format!("SMTP delivery failed: {}", e)))?;
        info!("✅ Digest sent to {} recipients", self.recipients.len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings() -> EmailSettings {
        EmailSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("digest@example.com".to_string()),
            password: Some("app-password".to_string()),
            recipients: vec!["dev@example.com".to_string(), "lead@example.com".to_string()],
            sender_email: None,
            sender_name: "JVM Tech News Digest".to_string(),
        }
    }

    #[test]
    fn test_incomplete_settings() {
        let mut incomplete = settings();
        incomplete.password = None;
        assert!(matches!(EmailSender::from_settings(&incomplete), Err(Error::Config(_))));

        let mut no_recipients = settings();
        no_recipients.recipients.clear();
        assert!(EmailSender::from_settings(&no_recipients).is_err());

        let mut bad_address = settings();
        bad_address.recipients = vec!["not an address".to_string()];
        assert!(EmailSender::from_settings(&bad_address).is_err());
    }

    #[test]
    fn test_build_message() {
        let sender = EmailSender::from_settings(&settings()).unwrap();
        assert!(!format!("{:?}", sender).contains("app-password"));

        let now = Utc.with_ymd_and_hms(2024, 3, 19, 8, 0, 0).unwrap();
        let mut article = Article::new("JDK 22 Is Released", "https://inside.java/jdk-22", "Inside Java");
        article.summary = "Twelve JEPs land in JDK 22.".to_string();
        article.importance_score = Some(0.9);

        let message = sender.build_message(&[&article], now).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: JVM Tech News Digest - 2024-03-19"));
        assert!(raw.contains("digest@example.com"));
        assert!(raw.contains("dev@example.com"));
        assert!(raw.contains("lead@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_empty_digest_is_not_sent() {
        let sender = EmailSender::from_settings(&settings()).unwrap();
        assert!(!sender.send_digest(&[]).await.unwrap());
    }
}
