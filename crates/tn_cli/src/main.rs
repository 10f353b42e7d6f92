mod job;
mod logging;

use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use tn_core::{Result, Settings};
use tn_digest::{DigestAssembler, EmailSender};
use tn_inference::models::simple::SimpleProcessor;
use tn_inference::{create_processor, Config};
use tn_sources::sources::sources_from_settings;
use tn_sources::{ContentExtractor, SourceManager};
use tracing::{debug, error, info, warn};

use crate::job::DigestJob;

#[derive(Debug, Clone, PartialEq)]
struct HumanDuration(Duration);

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3600),
        'd' => Some(86400),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    /// `12h`, `1h30m`, `1d 2h`; a trailing bare number counts as seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let overflow = || format!("Duration is too large: {}", s);
        let mut total: u64 = 0;
        let mut pending: Option<u64> = None;

        for c in s.chars() {
            if let Some(digit) = c.to_digit(10) {
                let value = pending
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(digit)))
                    .ok_or_else(overflow)?;
                pending = Some(value);
            } else if c.is_whitespace() {
                continue;
            } else {
                let multiplier = unit_seconds(c).ok_or_else(|| format!("Invalid duration unit: {}", c))?;
                let value = pending.take().ok_or_else(|| format!("Unit {} needs a number", c))?;
                total = value
                    .checked_mul(multiplier)
                    .and_then(|v| total.checked_add(v))
                    .ok_or_else(overflow)?;
            }
        }

        let total = match pending {
            Some(seconds) => total.checked_add(seconds).ok_or_else(overflow)?,
            None if s.trim().is_empty() => return Err("Duration must include a number".to_string()),
            None => total,
        };
        if total == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Collects JVM news and sends a scored, summarized digest", long_about = None)]
struct Cli {
    /// Log at DEBUG level
    #[arg(long)]
    debug: bool,
    /// Print the configuration with secrets masked, then exit
    #[arg(long)]
    show_config: bool,
    /// Run a single digest job and exit
    #[arg(long)]
    run_once: bool,
    /// Print the digest without sending email
    #[arg(long)]
    no_email: bool,
    /// Skip the local model host
    #[arg(long)]
    no_ollama: bool,
    /// Model to request from the local model host
    #[arg(long)]
    ollama_model: Option<String>,
    #[arg(
        long,
        default_value = "adaptive",
        help = "Processor to use: adaptive (default), ollama, openai, extractive, simple"
    )]
    processor: String,
    /// Time between jobs (e.g. 12h, 30m, 1h30m). Defaults to SCHEDULE_INTERVAL_HOURS
    #[arg(long)]
    interval: Option<HumanDuration>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if self.no_ollama {
            settings.enable_ollama = false;
        }
        if let Some(model) = &self.ollama_model {
            settings.ollama_model = model.clone();
        }
    }

    fn interval(&self, settings: &Settings) -> Duration {
        self.interval
            .as_ref()
            .map(|i| i.0)
            .unwrap_or_else(|| Duration::from_secs(settings.schedule_interval_hours.max(1) * 3600))
    }
}

fn print_masked_config(settings: &Settings) {
    let rule = "=".repeat(80);
    println!("\n{}", rule);
    println!("MASKED CONFIGURATION");
    println!("{}", rule);
    for (key, value) in settings.masked() {
        println!("{:<26} {}", key, value);
    }
    println!("{}\n", rule);
}

async fn build_job(cli: &Cli, settings: &Settings) -> Result<DigestJob> {
    let config = Config::from_settings(settings);

    let mut manager = SourceManager::new(settings.recent_articles_days).with_sources(sources_from_settings(settings)?);
    if settings.enable_web_crawling {
        manager = manager.with_extractor(ContentExtractor::new()?);
    }
    info!("📰 Sources: {}", manager.source_names().join(", "));

    let processor = match create_processor(&cli.processor, &config).await {
        Ok(processor) => processor,
        Err(e) => {
            error!("❌ Could not create processor '{}': {}, using Simple", cli.processor, e);
            Box::new(SimpleProcessor::new(config.sentences_count))
        }
    };
    info!("🧠 Processor initialized (using {})", processor.name());

    let assembler = DigestAssembler::new(settings.min_importance_score, settings.top_articles_in_digest);
    let mut job = DigestJob::new(manager, processor, config.sentences_count, assembler);

    if cli.no_email {
        info!("📭 Email delivery disabled");
    } else {
        match EmailSender::from_settings(&settings.email) {
            Ok(sender) => job = job.with_email(sender),
            Err(e) => warn!("⚠️ Email delivery disabled: {}", e),
        }
    }
    Ok(job)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let mut settings = Settings::from_env()?;
    cli.apply(&mut settings);

    if cli.show_config {
        print_masked_config(&settings);
        return Ok(());
    }

    let job = build_job(&cli, &settings).await?;

    if cli.run_once {
        return job.run().await.map(|_| ());
    }

    let interval = cli.interval(&settings);
    info!("⏰ Running every {}s with {}", interval.as_secs(), job.processor_name());
    loop {
        if let Err(e) = job.run().await {
            error!("❌ Digest job failed: {}", e);
        }
        info!("Waiting {}s before next digest", interval.as_secs());
        tokio::time::sleep(interval).await;
    }
}
