mod compositor;
mod config;
mod contour;
mod error;
mod geometry;
mod inspect;
mod mask;
mod pipeline;
mod sink;
mod source;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::JobConfig;
use mask::KeyBand;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace greenscreen regions of a still image with video content
    Video {
        /// Base image containing the greenscreen region(s)
        image: PathBuf,

        /// One replacement video per region, matched largest-region-first
        #[arg(required = true)]
        videos: Vec<PathBuf>,

        /// Output video path (MP4)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replace the largest greenscreen region with a background image
    Image {
        /// Base image containing the greenscreen region
        image: PathBuf,

        /// Background image to insert
        background: PathBuf,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate detection across a folder of images; the first image is
    /// used as the background for the review composites
    Inspect {
        /// Folder of input images
        input_dir: PathBuf,

        /// Folder receiving the annotated results
        output_dir: PathBuf,

        /// Ignore contours below this pixel area
        #[arg(long, default_value_t = contour::DEFAULT_MIN_AREA)]
        min_area: f64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match args.command {
        Command::Video {
            image,
            videos,
            output,
        } => {
            let config = JobConfig::builder()
                .base_image(image)
                .replacements(videos)
                .output(output)
                .build()?;

            let frames = pipeline::replace_with_videos(&config, &KeyBand::default())
                .context("Video compositing failed")?;
            println!(
                "Result saved to {} ({frames} frames)",
                config.output.display()
            );
        }

        Command::Image {
            image,
            background,
            output,
        } => {
            let config = JobConfig::builder()
                .base_image(image)
                .replacement(background)
                .output(output)
                .build()?;

            pipeline::replace_with_image(&config, &KeyBand::default())
                .context("Image compositing failed")?;
            println!("Result saved to {}", config.output.display());
        }

        Command::Inspect {
            input_dir,
            output_dir,
            min_area,
        } => {
            inspect::run(&input_dir, &output_dir, min_area)
                .context("Inspection run failed")?;
            println!("Results saved to {}", output_dir.display());
        }
    }

    Ok(())
}
