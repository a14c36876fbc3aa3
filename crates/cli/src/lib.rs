//! # Context Outline CLI
//!
//! Computes a merged structure outline for files seen through one or more
//! projects and emits it as a line-delimited JSON event on stdout.

pub mod events;
pub mod render;

use anyhow::{Context, Result};
use clap::Parser;
use context_outline::{
    Document, FeatureKind, Language, MarkerRule, OutlineConfig, SourceDocument, StructureComputer,
};
use events::{EventEmitter, StdioEventEmitter};
use std::path::PathBuf;
use std::sync::Arc;

/// One `--doc` argument: a file attributed to a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocArg {
    pub project: String,
    pub path: PathBuf,
}

fn parse_doc_arg(raw: &str) -> std::result::Result<DocArg, String> {
    let (project, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PROJECT=PATH, got '{raw}'"))?;
    if project.trim().is_empty() || path.trim().is_empty() {
        return Err(format!("project and path must be non-empty in '{raw}'"));
    }
    Ok(DocArg {
        project: project.trim().to_string(),
        path: PathBuf::from(path.trim()),
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "context-outline",
    version,
    about = "Merged structure outline across projects"
)]
pub struct Cli {
    /// File attributed to a project, processed in argument order
    #[arg(long = "doc", value_name = "PROJECT=PATH", required = true, value_parser = parse_doc_arg)]
    pub docs: Vec<DocArg>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Built-in feature discoverers, overriding the config (async,test,references)
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<FeatureKind>>,

    /// Tag declarations whose text contains this marker
    #[arg(long)]
    pub marker: Vec<String>,

    /// Feature name used for --marker tags
    #[arg(long, default_value = "marker")]
    pub marker_feature: String,

    /// Event name for the emitted outline
    #[arg(long, default_value = "structure")]
    pub event: String,

    /// Print an indented tree instead of emitting an event
    #[arg(long)]
    pub pretty: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Only warnings and errors on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Effective configuration: file (or defaults) plus command-line overrides
    pub fn resolve_config(&self) -> Result<OutlineConfig> {
        let mut config = match &self.config {
            Some(path) => OutlineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => OutlineConfig::default(),
        };

        if let Some(features) = &self.features {
            config.features = features.clone();
        }
        config.markers.extend(self.marker.iter().map(|marker| MarkerRule {
            marker: marker.clone(),
            feature: self.marker_feature.clone(),
            kinds: Vec::new(),
        }));

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Load every `--doc` the config accepts; rejected files are logged and skipped
pub async fn load_documents(docs: &[DocArg], config: &OutlineConfig) -> Result<Vec<Arc<dyn Document>>> {
    let mut documents: Vec<Arc<dyn Document>> = Vec::with_capacity(docs.len());

    for doc in docs {
        let language = Language::from_path(&doc.path);
        if !config.allows_language(language) {
            log::warn!(
                "Skipping {} ({}): language not enabled",
                doc.path.display(),
                language.as_str()
            );
            continue;
        }

        let size = tokio::fs::metadata(&doc.path)
            .await
            .with_context(|| format!("Failed to stat {}", doc.path.display()))?
            .len();
        if size > config.max_file_bytes {
            log::warn!(
                "Skipping {}: {size} bytes exceeds limit of {}",
                doc.path.display(),
                config.max_file_bytes
            );
            continue;
        }

        let document = SourceDocument::load(doc.project.clone(), &doc.path)
            .await
            .with_context(|| format!("Failed to read {}", doc.path.display()))?;
        documents.push(Arc::new(document));
    }

    Ok(documents)
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    run(cli).await
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let documents = load_documents(&cli.docs, &config).await?;
    let discoverers = config.discoverers();

    let outline = StructureComputer::compute(&documents, &discoverers).await;

    if cli.pretty {
        print!("{}", render::render_outline(&outline));
        return Ok(());
    }

    let body = serde_json::to_value(&outline).context("Failed to serialize outline")?;
    let emitter = StdioEventEmitter::stdout();
    emitter.emit(&cli.event, body).await;
    emitter.shutdown().await;
    Ok(())
}
