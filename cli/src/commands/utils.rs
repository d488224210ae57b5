//! Shared utility functions for CLI commands.

use anyhow::{Context, Result};
use blipprep_core::config::ProcessorConfig;
use ndarray::{Array3, Axis};
use std::fs;
use std::path::Path;

/// Load a processor config from a JSON or YAML file.
///
/// `.json` files are parsed as JSON, everything else as YAML. No path means an
/// empty config.
pub fn load_config(path: Option<&Path>) -> Result<ProcessorConfig> {
    let Some(path) = path else {
        return Ok(ProcessorConfig::new());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config = if is_json {
        ProcessorConfig::from_json_str(&contents)
    } else {
        ProcessorConfig::from_yaml_str(&contents)
    };
    config.with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Per-channel statistics of a `[C, H, W]` tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: f32,
    pub std: f32,
    pub min: f32,
    pub max: f32,
}

/// Compute mean/std/min/max for every channel (population std).
pub fn channel_stats(tensor: &Array3<f32>) -> Vec<ChannelStats> {
    tensor
        .axis_iter(Axis(0))
        .map(|channel| ChannelStats {
            mean: channel.mean().unwrap_or(0.0),
            std: if channel.is_empty() { 0.0 } else { channel.std(0.0) },
            min: channel.iter().copied().fold(f32::INFINITY, f32::min),
            max: channel.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        })
        .collect()
}

/// Format a shape as `[3, 384, 384]`.
pub fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("[{}]", dims.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_none_is_empty() {
        assert!(load_config(None).unwrap().is_empty());
    }

    #[test]
    fn test_load_config_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "image_size: 224\nmin_scale: 0.3").unwrap();

        let cfg = load_config(Some(file.path())).unwrap();

        assert_eq!(cfg.get_or("image_size", 0u32).unwrap(), 224);
        assert_eq!(cfg.get_or("min_scale", 0.0f64).unwrap(), 0.3);
    }

    #[test]
    fn test_load_config_json_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"prompt": "a picture of ", "max_words": 12}}"#).unwrap();

        let cfg = load_config(Some(file.path())).unwrap();

        assert_eq!(cfg.get_or("max_words", 0usize).unwrap(), 12);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/blipprep.yaml"))).unwrap_err();

        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_rejects_list_root() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "- 1\n- 2").unwrap();

        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_channel_stats() {
        let mut tensor = Array3::<f32>::zeros((2, 2, 2));
        tensor.index_axis_mut(Axis(0), 1).assign(&ndarray::arr2(&[[1.0, 3.0], [1.0, 3.0]]));

        let stats = channel_stats(&tensor);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].mean, 0.0);
        assert_eq!(stats[0].std, 0.0);
        assert_eq!(stats[1].mean, 2.0);
        assert_eq!(stats[1].std, 1.0);
        assert_eq!((stats[1].min, stats[1].max), (1.0, 3.0));
    }

    #[test]
    fn test_format_shape() {
        assert_eq!(format_shape(&[3, 384, 384]), "[3, 384, 384]");
    }
}
