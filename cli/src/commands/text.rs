//! `text` command.

use super::load_config;
use anyhow::{Context, Result};
use blipprep_core::registry::ProcessorRegistry;
use log::debug;
use std::path::Path;

/// Run a text processor over `caption` and return the cleaned string.
pub fn run_text(
    registry: &ProcessorRegistry,
    processor: &str,
    caption: &str,
    config: Option<&Path>,
) -> Result<String> {
    let cfg = load_config(config)?;
    let processor = registry
        .build(processor, &cfg)
        .with_context(|| format!("Failed to build processor '{}'", processor))?;

    debug!("Processing caption with {}", processor.name());
    let output = processor
        .process(caption.into())
        .with_context(|| format!("{} failed", processor.name()))?;
    Ok(output.into_text()?)
}

pub fn handle_text_command(
    registry: &ProcessorRegistry,
    processor: &str,
    caption: &str,
    config: Option<&Path>,
) -> Result<()> {
    println!("{}", run_text(registry, processor, caption, config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_run_text_with_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "prompt: \"a picture of \"").unwrap();

        let out = run_text(
            &ProcessorRegistry::with_defaults(),
            "blip_coco_text",
            "A Dog, Running! (fast)",
            Some(file.path()),
        )
        .unwrap();

        assert_eq!(out, "a picture of a dog, running fast");
    }

    #[test]
    fn test_run_text_unknown_processor() {
        let err = run_text(&ProcessorRegistry::with_defaults(), "nope", "x", None).unwrap_err();

        assert!(err.to_string().contains("Failed to build processor 'nope'"));
    }

    #[test]
    fn test_run_text_on_image_processor_fails() {
        let result = run_text(
            &ProcessorRegistry::with_defaults(),
            "blip_coco_vis_eval",
            "a caption",
            None,
        );

        assert!(result.is_err());
    }
}
