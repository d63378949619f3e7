//! Translate Pipeline CLI - runs the event-driven translation pipeline.
//!
//! `invoke` handles one storage notification payload; `watch` polls the input
//! location of the filesystem store and handles each new object as if a
//! notification had been delivered for it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use translate_pipeline_core::{
    services_from_config, AppConfig, ObjectStore, PipelineResponse, StorageNotification,
    TranslationPipeline, TranslatorConfig,
};

#[derive(Parser, Debug)]
#[command(name = "translate-pipeline")]
#[command(author, version, about = "Run the event-driven translation pipeline", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage root directory (overrides config)
    #[arg(long, env = "STORAGE_ROOT", global = true)]
    storage_root: Option<PathBuf>,

    /// OpenAI API base URL (overrides config)
    #[arg(long, env = "OPENAI_API_BASE", global = true)]
    api_base: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Model name for OpenAI-compatible API (overrides config)
    #[arg(long, env = "OPENAI_MODEL", global = true)]
    model: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Handle one notification payload and print the response
    Invoke {
        /// Notification JSON file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        event: String,
    },
    /// Poll the input location and handle every new object
    Watch {
        /// Seconds between scans
        #[arg(long, default_value = "2")]
        interval: u64,

        /// Only consider keys starting with this prefix
        #[arg(long, default_value = "")]
        prefix: String,

        /// Also handle objects that exist when watching starts
        #[arg(long)]
        existing: bool,

        /// Scan once and exit
        #[arg(long)]
        once: bool,
    },
}

impl Args {
    /// Load config file (or defaults) and apply command-line overrides.
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = if let Some(path) = &self.config {
            AppConfig::from_file(path).context("Failed to load config file")?
        } else {
            AppConfig::load()
        };

        if let Some(root) = &self.storage_root {
            config.storage.root.clone_from(root);
        }

        let translator = &config.translator;
        config.translator = TranslatorConfig {
            api_base: self.api_base.clone().unwrap_or_else(|| translator.api_base.clone()),
            api_key: self.api_key.clone().or_else(|| translator.api_key.clone()),
            model: self.model.clone().unwrap_or_else(|| translator.model.clone()),
            ..translator.clone()
        };

        Ok(config)
    }
}

fn read_event(source: &str) -> Result<Value> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read event file {source}"))?
    };
    serde_json::from_str(&content).context("Event is not valid JSON")
}

fn print_response(response: &PipelineResponse) -> Result<()> {
    let json = serde_json::to_string(response)?;
    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}

/// Keys in `listed` that were not in the previous listing.
///
/// `seen` becomes the current listing, so a key that disappears and later
/// comes back is handled again and deleted keys are not remembered forever.
fn new_keys(seen: &mut HashSet<String>, listed: Vec<String>) -> Vec<String> {
    let fresh = listed
        .iter()
        .filter(|key| !seen.contains(*key))
        .cloned()
        .collect();
    *seen = listed.into_iter().collect();
    fresh
}

/// Poll `location` and run the pipeline for each key not seen before,
/// one at a time.
async fn watch(
    pipeline: &TranslationPipeline,
    store: &dyn ObjectStore,
    prefix: &str,
    interval: Duration,
    existing: bool,
    once: bool,
) -> Result<()> {
    let location = pipeline.input_location().to_string();
    let mut seen: HashSet<String> = HashSet::new();

    if !existing {
        seen.extend(store.list(&location, prefix).await?);
        info!("Ignoring {} existing objects in {}", seen.len(), location);
    }

    info!("Watching {} every {}s", location, interval.as_secs());

    loop {
        let keys = match store.list(&location, prefix).await {
            Ok(listed) => new_keys(&mut seen, listed),
            Err(e) => {
                // Leave `seen` alone so the next good listing is not all "new"
                warn!("Failed to list {}: {}", location, e);
                Vec::new()
            }
        };

        for key in keys {
            let event = StorageNotification::for_object(&location, &key).to_value()?;
            let response = pipeline.handle(&event).await;
            print_response(&response)?;
        }

        if once {
            return Ok(());
        }
        tokio::time::sleep(interval).await;
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries pipeline responses
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = args.load_config()?;
    let services = services_from_config(&config).context("Failed to initialize services")?;
    let store = services.store.clone();
    let pipeline = TranslationPipeline::new(services, &config.storage);

    match args.command {
        Command::Invoke { event } => {
            let event = read_event(&event)?;
            let response = pipeline.handle(&event).await;
            print_response(&response)?;
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Watch {
            interval,
            prefix,
            existing,
            once,
        } => {
            watch(
                &pipeline,
                store.as_ref(),
                &prefix,
                Duration::from_secs(interval.max(1)),
                existing,
                once,
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
