use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cupbench::detection::RtenObjectModel;
use cupbench::render::TextRenderer;
use cupbench::{BenchConfig, GeometricDetector, LearnedDetector, Pipeline};

#[derive(Parser)]
#[command(name = "cupbench")]
#[command(about = "Compare a classical circle detector against a learned object detector")]
struct Cli {
    /// Directory holding the input images
    #[arg(value_name = "ASSETS_DIR")]
    assets_dir: PathBuf,

    /// Path to the object detection model (.rten)
    #[arg(long, value_name = "PATH")]
    model: PathBuf,

    /// Output directory (defaults to ASSETS_DIR)
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only process images whose file name starts with this prefix
    #[arg(long, value_name = "P")]
    prefix: Option<String>,

    /// TrueType font for titles and labels
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => BenchConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BenchConfig::default(),
    };
    if args.prefix.is_some() {
        config.output.input_prefix = args.prefix.clone();
    }
    if args.font.is_some() {
        config.style.font_path = args.font.clone();
    }

    let text = TextRenderer::discover(config.style.font_path.as_deref(), config.style.font_size);

    info!("Loading model: {}", args.model.display());
    let model = RtenObjectModel::load(&args.model, &config.learned)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;

    let pipeline = Pipeline::new(config.clone())
        .with_text_renderer(text)
        .add_detector(Box::new(GeometricDetector::new(config.geometric.clone())))
        .add_detector(Box::new(LearnedDetector::new(
            Box::new(model),
            config.learned.clone(),
        )));

    let out_dir = args.out.clone().unwrap_or_else(|| args.assets_dir.clone());
    let outcome = pipeline
        .run(&args.assets_dir, &out_dir)
        .context("Comparison run failed")?;

    println!("\n{}", outcome.table());
    println!("{}", outcome.stats);
    if !outcome.skipped.is_empty() {
        println!("Skipped {} unreadable file(s)", outcome.skipped.len());
    }

    Ok(())
}
