//! CLI tool for building a PowerPoint deck from slide screenshots and
//! Reveal.js speaker notes.

mod pipeline;

use anyhow::Result;
use clap::Parser;
use deck_core::ImageLocator;
use pipeline::Pipeline;
use std::path::PathBuf;

/// Build a PPTX from screenshot PNGs plus speaker notes extracted from index.html.
#[derive(Parser, Debug)]
#[command(name = "build-deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reveal.js slideshow holding the speaker notes
    #[arg(long, default_value = "index.html")]
    html: PathBuf,

    /// Directory of slide screenshots
    #[arg(long, default_value = "exports/slides")]
    slides_dir: PathBuf,

    /// Output presentation file
    #[arg(short, long, default_value = "workshop-prezentacia.pptx")]
    output: PathBuf,

    /// Screenshot file name prefix
    #[arg(long, default_value = deck_core::images::DEFAULT_PREFIX)]
    prefix: String,

    /// Screenshot file extension
    #[arg(long, default_value = deck_core::images::DEFAULT_EXTENSION)]
    extension: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let locator = ImageLocator::new().with_naming(&args.prefix, &args.extension)?;
    let pipeline = Pipeline::new(args.html, args.slides_dir, args.output).with_locator(locator);

    let summary = pipeline.run()?;
    println!("Saved {} with {} slides", summary.output.display(), summary.slides);
    log::debug!("{} sections, {} images", summary.sections, summary.images);

    Ok(())
}
