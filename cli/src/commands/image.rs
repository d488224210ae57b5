//! `image` command.

use super::{channel_stats, format_shape, load_config, ChannelStats};
use anyhow::{Context, Result};
use blipprep_core::registry::ProcessorRegistry;
use colored::*;
use log::{debug, info};
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

const CHANNEL_NAMES: [&str; 3] = ["R", "G", "B"];

/// Run an image processor over the file at `image_path`.
///
/// With a `seed`, random processors draw from a seeded `StdRng` so repeated
/// runs give the same tensor.
pub fn run_image(
    registry: &ProcessorRegistry,
    processor: &str,
    image_path: &Path,
    config: Option<&Path>,
    seed: Option<u64>,
) -> Result<Array3<f32>> {
    let cfg = load_config(config)?;
    let processor = registry
        .build(processor, &cfg)
        .with_context(|| format!("Failed to build processor '{}'", processor))?;

    let image = ::image::open(image_path)
        .with_context(|| format!("Failed to open image: {}", image_path.display()))?;
    info!(
        "Loaded {} ({}x{})",
        image_path.display(),
        image.width(),
        image.height()
    );

    let output = match seed {
        Some(seed) => {
            debug!("Using seed {}", seed);
            let mut rng = StdRng::seed_from_u64(seed);
            processor.process_with_rng(image.into(), &mut rng)
        }
        None => processor.process(image.into()),
    }
    .with_context(|| format!("{} failed", processor.name()))?;

    Ok(output.into_tensor()?)
}

pub fn handle_image_command(
    registry: &ProcessorRegistry,
    processor: &str,
    image_path: &Path,
    config: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let tensor = run_image(registry, processor, image_path, config, seed)?;

    println!("{} {}", "Shape:".bold(), format_shape(tensor.shape()).cyan());
    for (i, stats) in channel_stats(&tensor).iter().enumerate() {
        print_channel(CHANNEL_NAMES.get(i).copied().unwrap_or("?"), stats);
    }
    Ok(())
}

fn print_channel(name: &str, stats: &ChannelStats) {
    println!(
        "  {}  mean {:>8.4}  std {:>7.4}  range [{:.4}, {:.4}]",
        name.bold(),
        stats.mean,
        stats.std,
        stats.min,
        stats.max
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use blipprep_core::testing::{gradient_image, png_bytes};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("input.png");
        std::fs::write(&path, png_bytes(&gradient_image(64, 48)).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_run_image_eval_with_config() {
        let dir = TempDir::new().unwrap();
        let image = write_png(&dir);
        let config = dir.path().join("eval.yaml");
        std::fs::write(&config, "image_size: 24\n").unwrap();

        let tensor = run_image(
            &ProcessorRegistry::with_defaults(),
            "blip_coco_vis_eval",
            &image,
            Some(&config),
            None,
        )
        .unwrap();

        assert_eq!(tensor.shape(), &[3, 24, 24]);
    }

    #[test]
    fn test_run_image_seed_is_reproducible() {
        let dir = TempDir::new().unwrap();
        let image = write_png(&dir);
        let config = dir.path().join("train.json");
        std::fs::write(&config, r#"{"image_size": 16}"#).unwrap();
        let registry = ProcessorRegistry::with_defaults();

        let a = run_image(&registry, "blip_coco_vis_train", &image, Some(&config), Some(3)).unwrap();
        let b = run_image(&registry, "blip_coco_vis_train", &image, Some(&config), Some(3)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_run_image_missing_file() {
        let err = run_image(
            &ProcessorRegistry::with_defaults(),
            "blip_coco_vis_eval",
            Path::new("/nonexistent/input.png"),
            None,
            None,
        )
        .unwrap_err();

        assert!(err.to_string().contains("Failed to open image"));
    }
}
