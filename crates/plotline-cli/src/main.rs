//! Plotline CLI - Command-line interface
//!
//! Usage:
//!   plotline parse <dir>
//!   plotline detect <dir> [--character <name>]... [--location <name>]...
//!   plotline dialogue <dir>
//!   plotline entity <dir> <name> [--known <name>]...
//!
//! Results are written to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use plotline_core::{load_documents, AppConfig, Document, ParseResult, DEFAULT_EXTENSIONS};
use plotline_extractor::{EntityAggregator, FileExtraction, MentionSearch, MergedCandidates};

#[derive(Parser)]
#[command(name = "plotline")]
#[command(about = "Story analysis: dialogue, characters, locations and relationships")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract characters, locations, relationships and dialogue
    Parse {
        /// Directory or file with story documents
        path: PathBuf,
    },
    /// Suggest entities that are not known yet
    Detect {
        /// Directory or file with story documents
        path: PathBuf,
        /// Already known character (repeatable)
        #[arg(long = "character")]
        characters: Vec<String>,
        /// Already known location (repeatable)
        #[arg(long = "location")]
        locations: Vec<String>,
    },
    /// List every attributed dialogue line
    Dialogue {
        /// Directory or file with story documents
        path: PathBuf,
    },
    /// Show dialogue, mentions and statistics for one entity
    Entity {
        /// Directory or file with story documents
        path: PathBuf,
        /// Entity name
        name: String,
        /// Known names to list alongside each mention (repeatable)
        #[arg(long = "known")]
        known: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config, cli.log_level.as_deref());

    let aggregator = Arc::new(EntityAggregator::with_config(&config.extractor));

    match cli.command {
        Commands::Parse { path } => {
            let documents = load(&path)?;
            let merged = extract_all(&aggregator, &documents, Extraction::Full).await?;
            let relationships = aggregator.relationships_for(&documents, &merged);

            tracing::info!(
                "{} characters, {} locations, {} relationships",
                merged.characters.len(),
                merged.locations.len(),
                relationships.len()
            );

            let result = ParseResult {
                characters: merged.characters,
                locations: merged.locations,
                relationships,
                dialogue: merged.dialogue,
            };
            print_json(&result, cli.pretty)?;
        }
        Commands::Detect {
            path,
            characters,
            locations,
        } => {
            let documents = load(&path)?;
            let merged = extract_all(&aggregator, &documents, Extraction::Candidates).await?;
            let detected = aggregator.detect_from(merged, &characters, &locations);
            print_json(&detected, cli.pretty)?;
        }
        Commands::Dialogue { path } => {
            let documents = load(&path)?;
            let search = MentionSearch::with_config(&documents, &config.extractor);
            print_json(search.all_dialogue(), cli.pretty)?;
        }
        Commands::Entity { path, name, known } => {
            let documents = load(&path)?;
            let search =
                MentionSearch::with_config(&documents, &config.extractor).with_known_names(&known);
            let profile = search.profile(&name);

            tracing::info!(
                "{}: {} dialogue lines, {} mentions",
                profile.name,
                profile.stats.dialogue_count,
                profile.stats.mention_count
            );
            print_json(&profile, cli.pretty)?;
        }
    }

    Ok(())
}

/// Configuration from a TOML file layered under the environment, or from the
/// environment alone
fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)
            .and_then(AppConfig::with_env_override)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::from_env().context("invalid configuration in environment")?,
    };
    Ok(config)
}

fn init_tracing(config: &AppConfig, log_level: Option<&str>) {
    let level = log_level.unwrap_or(config.logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load(path: &Path) -> anyhow::Result<Vec<Document>> {
    let documents = load_documents(path, DEFAULT_EXTENSIONS)
        .with_context(|| format!("failed to load documents from {}", path.display()))?;
    tracing::info!("Loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

#[derive(Debug, Clone, Copy)]
enum Extraction {
    /// Dialogue, characters and locations
    Full,
    /// Characters and locations only
    Candidates,
}

/// Extract every document on the blocking pool and merge in document order
async fn extract_all(
    aggregator: &Arc<EntityAggregator>,
    documents: &[Document],
    mode: Extraction,
) -> anyhow::Result<MergedCandidates> {
    let mut tasks = JoinSet::new();
    for (index, document) in documents.iter().cloned().enumerate() {
        let aggregator = Arc::clone(aggregator);
        tasks.spawn_blocking(move || {
            let extraction = match mode {
                Extraction::Full => aggregator.extract_file(&document),
                Extraction::Candidates => aggregator.extract_candidates(&document),
            };
            (index, extraction)
        });
    }

    let mut extractions: Vec<Option<FileExtraction>> = vec![None; documents.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, extraction) = joined.context("extraction task failed")?;
        extractions[index] = Some(extraction);
    }

    Ok(aggregator.merge(extractions.into_iter().flatten().collect()))
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
