use chrono::Utc;
use tn_core::{Article, ArticleProcessor, Result};
use tn_digest::{render_console, DigestAssembler, EmailSender};
use tn_inference::models::simple::SimpleProcessor;
use tn_sources::SourceManager;
use tracing::{error, info, warn};

/// One digest run: collect, summarize and score, assemble, then deliver.
pub struct DigestJob {
    manager: SourceManager,
    processor: Box<dyn ArticleProcessor>,
    fallback: SimpleProcessor,
    assembler: DigestAssembler,
    email: Option<EmailSender>,
}

impl DigestJob {
    pub fn new(
        manager: SourceManager,
        processor: Box<dyn ArticleProcessor>,
        sentences_count: usize,
        assembler: DigestAssembler,
    ) -> Self {
        Self {
            manager,
            processor,
            fallback: SimpleProcessor::new(sentences_count),
            assembler,
            email: None,
        }
    }

    pub fn with_email(mut self, sender: EmailSender) -> Self {
        self.email = Some(sender);
        self
    }

    pub fn processor_name(&self) -> &str {
        self.processor.name()
    }

    async fn process(&self, articles: &mut [Article]) {
        if let Err(e) = self.processor.process_articles(articles).await {
            error!("❌ {} failed: {}, falling back to {}", self.processor.name(), e, self.fallback.name());
            if let Err(e) = self.fallback.process_articles(articles).await {
                error!("❌ {} failed: {}", self.fallback.name(), e);
            }
        }
    }

    /// Returns the console rendering of the digest, or `None` when nothing was collected.
    /// Delivery failures are returned after the digest has been printed.
    pub async fn run(&self) -> Result<Option<String>> {
        info!("🚀 Starting digest job");
        let mut articles = self.manager.collect().await;
        if articles.is_empty() {
            warn!("No relevant articles found");
            return Ok(None);
        }
        info!("🧠 Processing {} articles with {}", articles.len(), self.processor.name());
        self.process(&mut articles).await;

        let digest = self.assembler.assemble(&articles);
        let rendered = render_console(&digest, Utc::now());
        println!("{}", rendered);

        if let Some(sender) = &self.email {
            sender.send_digest(&digest).await?;
        }
        Ok(Some(rendered))
    }
}
