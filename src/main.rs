use anyhow::{Result, bail};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use platecheck::{Pipeline, PlateClass, RecognitionConfig, RecognitionResult, TemplateSource, load_config};

#[derive(Parser)]
#[command(name = "platecheck")]
#[command(about = "Read license plate numbers from photographs")]
struct Cli {
    /// Input image files
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Directory of character template images (label = file stem)
    #[arg(short, long, value_name = "DIR")]
    templates: PathBuf,

    /// Plate class: car or motorcycle
    #[arg(short, long, value_name = "TYPE")]
    plate_type: Option<PlateClass>,

    /// TOML file overriding the recognition parameters
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print one JSON object per image
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    image: &'a Path,
    #[serde(flatten)]
    result: &'a RecognitionResult,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RecognitionConfig::default(),
    };
    if let Some(class) = args.plate_type {
        config.plate_class = class;
    }

    if let Some(dir) = &args.debug_out {
        if dir.exists() && std::fs::read_dir(dir)?.next().is_some() {
            bail!("Debug directory is not empty: {}", dir.display());
        }
    }

    let source = template_source(&args.templates, args.images.len(), &config);

    for (i, image) in args.images.iter().enumerate() {
        let mut pipeline = Pipeline::new(source.clone()).with_config(config.clone())?;
        if let Some(dir) = &args.debug_out {
            let image_dir = if args.images.len() == 1 {
                dir.clone()
            } else {
                dir.join(format!("{:02}", i + 1))
            };
            pipeline = pipeline.with_debug(image_dir)?;
        }

        let result = pipeline.recognize_path(image);
        if args.json {
            println!("{}", serde_json::to_string(&Report { image, result: &result })?);
        } else if args.images.len() == 1 {
            println!("{}", result);
        } else {
            println!("{}: {}", image.display(), result);
        }
    }

    Ok(())
}

/// One image reloads the directory per run; several share one library.
/// A directory that fails to preload is left to fail per image.
fn template_source(dir: &Path, image_count: usize, config: &RecognitionConfig) -> TemplateSource {
    if image_count < 2 {
        return TemplateSource::Directory(dir.to_path_buf());
    }
    match TemplateSource::preload(dir, config.matching.template_threshold) {
        Ok(source) => {
            debug!(dir = %dir.display(), "template library preloaded");
            source
        }
        Err(e) => {
            warn!(error = %e, "could not preload templates");
            TemplateSource::Directory(dir.to_path_buf())
        }
    }
}
