//! Blipprep CLI - run BLIP caption and image processors from the command line.
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`commands`] | Command handlers organized by subcommand |
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `list` | Show registered processors |
//! | `text` | Clean a caption or question with a text processor |
//! | `image` | Run an image processor and print tensor statistics |

mod commands;

use anyhow::Result;
use blipprep_core::registry::ProcessorRegistry;
use clap::{Parser, Subcommand};
use commands::image::handle_image_command;
use commands::list::handle_list_command;
use commands::text::handle_text_command;
use std::path::PathBuf;

/// Blipprep CLI - BLIP vision-language preprocessing
#[derive(Parser)]
#[command(name = "blipprep")]
#[command(about = "Blipprep CLI - Run BLIP caption and image processors", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered processors
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clean a caption with a text processor
    Text {
        /// Registry key (e.g., "blip_coco_text")
        #[arg(value_name = "PROCESSOR")]
        processor: String,

        /// Raw caption or question
        #[arg(value_name = "CAPTION")]
        caption: String,

        /// Processor config file (YAML, or JSON with a .json extension)
        #[arg(short, long, value_name = "FILE", env = "BLIPPREP_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Run an image processor on an image file
    Image {
        /// Registry key (e.g., "blip_coco_vis_eval")
        #[arg(value_name = "PROCESSOR")]
        processor: String,

        /// Path to the image file
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Processor config file (YAML, or JSON with a .json extension)
        #[arg(short, long, value_name = "FILE", env = "BLIPPREP_CONFIG")]
        config: Option<PathBuf>,

        /// Seed for random augmentation
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    run_command(cli)
}

fn run_command(cli: Cli) -> Result<()> {
    let registry = ProcessorRegistry::global();

    match cli.command {
        Commands::List { json } => handle_list_command(registry, json),
        Commands::Text {
            processor,
            caption,
            config,
        } => handle_text_command(registry, &processor, &caption, config.as_deref()),
        Commands::Image {
            processor,
            image,
            config,
            seed,
        } => handle_image_command(registry, &processor, &image, config.as_deref(), seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_image_command() {
        let cli = Cli::try_parse_from([
            "blipprep",
            "-v",
            "image",
            "blip_coco_vis_train",
            "cat.jpg",
            "--seed",
            "42",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Image {
                processor, seed, ..
            } => {
                assert_eq!(processor, "blip_coco_vis_train");
                assert_eq!(seed, Some(42));
            }
            _ => panic!("Expected image command"),
        }
    }
}
