//! Command-line interface for agendavoz.
//!
//! - `agendavoz run` — upload endpoint + periodic ingestion pipeline
//! - `agendavoz scan` — one ingestion cycle, then exit
//! - `agendavoz extract` — run the date/time extractor on a transcript
//! - `agendavoz config` — show the resolved configuration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::oneshot;

use crate::adapters::{CalendarApiClient, SpeechApiClient};
use crate::config::AppConfig;
use crate::extract;
use crate::ingest::{FileRegistry, IngestionScheduler};
use crate::web::{self, UploadState};

/// agendavoz - voice memos in, calendar events out
#[derive(Parser, Debug)]
#[command(name = "agendavoz")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to agendavoz.yaml (searched in parent directories if omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the upload endpoint and the periodic ingestion pipeline
    Run {
        /// Run only the pipeline, without the upload endpoint
        #[arg(long)]
        no_server: bool,
    },

    /// Run a single ingestion cycle and exit
    Scan,

    /// Extract a date/time from transcript text (debugging aid)
    Extract {
        /// Transcript text
        text: String,

        /// Year to assume when the text carries none
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show the resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Run { no_server } => execute_run(config, no_server).await,
            Commands::Scan => execute_scan(config).await,
            Commands::Extract { text, year } => execute_extract(&text, year),
            Commands::Config => execute_config(&config),
        }
    }
}

fn build_scheduler(config: &AppConfig) -> IngestionScheduler {
    let registry = FileRegistry::new(config.upload_dir.clone(), config.extensions.clone());
    let transcriber = Arc::new(SpeechApiClient::new(&config.speech));
    let calendar = Arc::new(CalendarApiClient::new(&config.calendar));

    IngestionScheduler::new(
        registry,
        transcriber,
        calendar,
        Duration::from_secs(config.call_timeout_secs),
        config.max_attempts,
    )
}

/// Run until Ctrl-C: upload endpoint task + timer-driven pipeline.
async fn execute_run(config: AppConfig, no_server: bool) -> Result<()> {
    let mut scheduler = build_scheduler(&config);
    scheduler.registry().bootstrap().await?;

    if !no_server {
        let state = Arc::new(UploadState {
            upload_dir: config.upload_dir.clone(),
        });
        let addr = config.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = web::serve(addr, state).await {
                tracing::error!(error = %e, "upload endpoint stopped");
            }
        });
    }

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        let _ = stop_tx.send(());
    });

    scheduler
        .run(Duration::from_secs(config.interval_secs), stop_rx)
        .await;

    Ok(())
}

/// Run one cycle and print its report.
async fn execute_scan(config: AppConfig) -> Result<()> {
    let mut scheduler = build_scheduler(&config);

    let report = scheduler.run_cycle().await?;

    println!("Cycle results for {}:", config.upload_dir.display());
    println!("  Events scheduled:       {}", report.scheduled);
    println!("  Transcription failures: {}", report.transcription_failures);
    println!("  No date/time found:     {}", report.extraction_misses);
    println!("  Calendar failures:      {}", report.calendar_failures);
    println!("  Archive failures:       {}", report.archive_failures);
    println!("  Unreadable files:       {}", report.unreadable);
    println!("  Quarantined:            {}", report.quarantined);

    Ok(())
}

fn execute_extract(text: &str, year: Option<i32>) -> Result<()> {
    let schedule = match year {
        Some(y) => extract::extract_with_year(text, y),
        None => extract::extract(text),
    };

    match schedule {
        Some(s) => {
            println!("start: {}", s.start);
            println!("end:   {}", s.end);
        }
        None => {
            println!("no date/time recognized");
        }
    }

    Ok(())
}

fn execute_config(config: &AppConfig) -> Result<()> {
    println!("agendavoz configuration");
    println!(
        "  Config file:     {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!("  Upload dir:      {}", config.upload_dir.display());
    println!("  Interval:        {} seconds", config.interval_secs);
    println!("  Extensions:      {:?}", config.extensions);
    println!("  Call timeout:    {} seconds", config.call_timeout_secs);
    println!("  Max attempts:    {}", config.max_attempts);
    println!("  Listen address:  {}", config.listen_addr);
    println!("  Speech endpoint: {}", config.speech.endpoint);
    println!("  Language:        {}", config.speech.language);
    println!("  Sample rate:     {} Hz", config.speech.sample_rate_hz);
    println!("  Calendar:        {} ({})", config.calendar.endpoint, config.calendar.calendar_id);

    Ok(())
}
