use anyhow::{Context, Result};
use billscan_ocr::{OcrConfig, ScreenshotReader, TemplateStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;

/// Reads amounts and dates out of payment screenshots.
#[derive(Parser, Debug)]
#[command(name = "billscan", version)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the template directory from the configuration
    #[arg(short, long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the amount and date from each screenshot
    Scan {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Read free text from one rectangle of a screenshot
    Region {
        image: PathBuf,
        #[arg(long)]
        top: usize,
        #[arg(long)]
        left: usize,
        #[arg(long)]
        bottom: usize,
        #[arg(long)]
        right: usize,
        /// Also write the tightened region and each glyph crop as PNGs here
        #[arg(long)]
        dump_dir: Option<PathBuf>,
    },
    /// Read the regions of every (or one) configured screenshot layout
    Layout {
        image: PathBuf,
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// List the loaded glyph templates as JSON
    Templates,
    /// Scan new screenshots dropped into a folder, reloading templates on change
    Watch { intake_dir: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => OcrConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => OcrConfig::default(),
    };
    if let Some(dir) = args.templates {
        config.template_dir = dir;
    }

    let store = TemplateStore::open(&config.template_dir, config.min_component_pixels)
        .with_context(|| format!("Failed to load templates from {}", config.template_dir.display()))?;
    let reader = Arc::new(ScreenshotReader::from_config(Arc::new(store), &config)?);

    match args.command {
        Command::Scan { images } => commands::scan(&reader, &images),
        Command::Region { image, top, left, bottom, right, dump_dir } => commands::region(
            &reader,
            &image,
            billscan_ocr::Rect::new(top, left, bottom, right),
            dump_dir.as_deref(),
        ),
        Command::Layout { image, profile } => commands::layout(&reader, &config, &image, profile.as_deref()),
        Command::Templates => commands::templates(&reader),
        Command::Watch { intake_dir } => commands::watch(reader, &config, &intake_dir).await,
    }
}
