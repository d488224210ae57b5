//! Processor registry - name-based lookup of processor builders.
//!
//! A training harness selects processors by string key:
//!
//! ```rust
//! use blipprep_core::config::ProcessorSpec;
//! use blipprep_core::registry::ProcessorRegistry;
//!
//! let spec = ProcessorSpec::new("blip_coco_text").with("prompt", "a picture of ");
//! let processor = ProcessorRegistry::global().build_from_spec(&spec)?;
//! assert_eq!(processor.name(), "blip_coco_text");
//! # Ok::<(), blipprep_core::error::ProcessorError>(())
//! ```

use crate::config::{ProcessorConfig, ProcessorSpec};
use crate::error::{ProcessorError, ProcessorResult};
use crate::processors::{
    BlipCaptionProcessor, BlipImageEvalProcessor, BlipImageTrainProcessor, BlipQuestionProcessor,
    Processor,
};
use lazy_static::lazy_static;
use log::{debug, info};
use std::collections::HashMap;

/// Builds a processor from its configuration.
pub type ProcessorBuilder = fn(&ProcessorConfig) -> ProcessorResult<Box<dyn Processor>>;

lazy_static! {
    static ref GLOBAL_REGISTRY: ProcessorRegistry = ProcessorRegistry::with_defaults();
}

/// Name-to-builder lookup table.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    builders: HashMap<String, ProcessorBuilder>,
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

fn build_caption(cfg: &ProcessorConfig) -> ProcessorResult<Box<dyn Processor>> {
    Ok(Box::new(BlipCaptionProcessor::build(Some(cfg))?))
}

fn build_question(cfg: &ProcessorConfig) -> ProcessorResult<Box<dyn Processor>> {
    Ok(Box::new(BlipQuestionProcessor::build(Some(cfg))?))
}

fn build_image_train(cfg: &ProcessorConfig) -> ProcessorResult<Box<dyn Processor>> {
    Ok(Box::new(BlipImageTrainProcessor::build(Some(cfg))?))
}

fn build_image_eval(cfg: &ProcessorConfig) -> ProcessorResult<Box<dyn Processor>> {
    Ok(Box::new(BlipImageEvalProcessor::build(Some(cfg))?))
}

impl ProcessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in processors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, builder) in [
            (BlipCaptionProcessor::NAME, build_caption as ProcessorBuilder),
            (BlipQuestionProcessor::NAME, build_question),
            (BlipImageTrainProcessor::NAME, build_image_train),
            (BlipImageEvalProcessor::NAME, build_image_eval),
        ] {
            registry.builders.insert(name.to_string(), builder);
        }
        registry
    }

    /// Shared registry with the built-in processors.
    pub fn global() -> &'static ProcessorRegistry {
        &GLOBAL_REGISTRY
    }

    /// Register `builder` under `name`. Names must be unique.
    pub fn register(&mut self, name: impl Into<String>, builder: ProcessorBuilder) -> ProcessorResult<()> {
        let name = name.into();
        if self.builders.contains_key(&name) {
            return Err(ProcessorError::DuplicateProcessor(name));
        }
        info!("Registered processor '{}'", name);
        self.builders.insert(name, builder);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Build the processor registered under `name`.
    pub fn build(&self, name: &str, cfg: &ProcessorConfig) -> ProcessorResult<Box<dyn Processor>> {
        let builder = self
            .builders
            .get(name)
            .ok_or_else(|| ProcessorError::UnknownProcessor(name.to_string()))?;
        debug!("Building processor '{}' with keys {:?}", name, cfg.keys());
        builder(cfg)
    }

    /// Build from a `{ name, ..config }` spec.
    pub fn build_from_spec(&self, spec: &ProcessorSpec) -> ProcessorResult<Box<dyn Processor>> {
        self.build(&spec.name, &spec.config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProcessorInput, ProcessorOutput};

    fn build_short_question(_cfg: &ProcessorConfig) -> ProcessorResult<Box<dyn Processor>> {
        Ok(Box::new(BlipQuestionProcessor::new(3)))
    }

    #[test]
    fn test_defaults_registered() {
        let registry = ProcessorRegistry::with_defaults();

        assert_eq!(
            registry.names(),
            vec![
                "blip_coco_text",
                "blip_coco_vis_eval",
                "blip_coco_vis_train",
                "blip_question"
            ]
        );
    }

    #[test]
    fn test_unknown_processor() {
        let registry = ProcessorRegistry::with_defaults();

        let result = registry.build("clip_image_train", &ProcessorConfig::new());

        assert!(matches!(result, Err(ProcessorError::UnknownProcessor(name)) if name == "clip_image_train"));
    }

    #[test]
    fn test_register_custom_and_duplicate() {
        let mut registry = ProcessorRegistry::new();
        assert!(registry.is_empty());

        registry.register("short_question", build_short_question).unwrap();
        let duplicate = registry.register("short_question", build_short_question);

        assert!(matches!(duplicate, Err(ProcessorError::DuplicateProcessor(_))));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("short_question"));
    }

    #[test]
    fn test_duplicate_of_builtin_rejected() {
        let mut registry = ProcessorRegistry::with_defaults();

        assert!(registry.register("blip_coco_text", build_caption).is_err());
    }

    #[test]
    fn test_build_text_processor_from_config() {
        let cfg = ProcessorConfig::new().with("prompt", "a picture of ");

        let processor = ProcessorRegistry::global().build("blip_coco_text", &cfg).unwrap();
        let output = processor.process(ProcessorInput::from("A Cat!")).unwrap();

        assert_eq!(output, ProcessorOutput::Text("a picture of a cat".to_string()));
    }

    #[test]
    fn test_build_error_propagates() {
        let cfg = ProcessorConfig::new().with("image_size", "large");

        let result = ProcessorRegistry::global().build("blip_coco_vis_eval", &cfg);

        assert!(matches!(result, Err(ProcessorError::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_lists_names() {
        let debug = format!("{:?}", ProcessorRegistry::with_defaults());

        assert!(debug.contains("blip_question"));
    }
}
