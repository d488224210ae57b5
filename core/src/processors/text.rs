//! Caption and question cleaning.

use super::{Processor, TextProcessor};
use crate::config::ProcessorConfig;
use crate::error::{ProcessorError, ProcessorResult};
use crate::types::{ProcessorInput, ProcessorOutput};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    /// Punctuation removed from captions and questions
    static ref PUNCTUATION: Regex =
        Regex::new(r#"([.!"()*#:;~])"#).expect("punctuation pattern is valid");

    /// Runs of whitespace, counting the ASCII separators 0x1c-0x1f as whitespace
    static ref REPEATED_WHITESPACE: Regex =
        Regex::new(r"[\s\x1c-\x1f]{2,}").expect("whitespace pattern is valid");
}

/// Keep at most `max_words` space-separated words.
fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    if words.len() > max_words {
        words[..max_words].join(" ")
    } else {
        text.to_string()
    }
}

fn expect_text(input: ProcessorInput, processor: &str) -> ProcessorResult<String> {
    match input {
        ProcessorInput::Text(text) => Ok(text),
        other => Err(ProcessorError::InvalidInput(format!(
            "{} requires text input (got {})",
            processor,
            other.kind()
        ))),
    }
}

/// Caption cleaner with an optional prompt prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlipCaptionProcessor {
    prompt: String,
    max_words: usize,
}

impl BlipCaptionProcessor {
    pub const NAME: &'static str = "blip_coco_text";
    pub const DEFAULT_MAX_WORDS: usize = 30;

    pub fn new(prompt: impl Into<String>, max_words: usize) -> Self {
        Self {
            prompt: prompt.into(),
            max_words,
        }
    }

    /// Build from config keys `prompt` (default `""`) and `max_words` (default 30).
    pub fn build(cfg: Option<&ProcessorConfig>) -> ProcessorResult<Self> {
        let empty = ProcessorConfig::default();
        let cfg = cfg.unwrap_or(&empty);

        let prompt: String = cfg.get_or("prompt", String::new())?;
        let max_words: usize = cfg.get_or("max_words", Self::DEFAULT_MAX_WORDS)?;

        debug!(
            "Building {} (prompt={:?}, max_words={})",
            Self::NAME,
            prompt,
            max_words
        );
        Ok(Self::new(prompt, max_words))
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Normalize a caption without the prompt.
    ///
    /// Lower-cases, replaces `. ! " ( ) * # : ; ~` with spaces, collapses
    /// whitespace runs, trims, then truncates to `max_words` words.
    pub fn pre_caption(&self, caption: &str) -> String {
        let lowered = caption.to_lowercase();
        let spaced = PUNCTUATION.replace_all(&lowered, " ");
        let collapsed = REPEATED_WHITESPACE.replace_all(&spaced, " ");
        let trimmed = collapsed.trim_end_matches('\n').trim_matches(' ');

        truncate_words(trimmed, self.max_words)
    }
}

impl Default for BlipCaptionProcessor {
    fn default() -> Self {
        Self::new("", Self::DEFAULT_MAX_WORDS)
    }
}

impl TextProcessor for BlipCaptionProcessor {
    fn process_text(&self, caption: &str) -> String {
        let mut out = self.prompt.clone();
        out.push_str(&self.pre_caption(caption));
        out
    }
}

impl Processor for BlipCaptionProcessor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, input: ProcessorInput) -> ProcessorResult<ProcessorOutput> {
        let caption = expect_text(input, Self::NAME)?;
        Ok(ProcessorOutput::Text(self.process_text(&caption)))
    }
}

/// Question cleaner for VQA-style datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlipQuestionProcessor {
    max_words: usize,
}

impl BlipQuestionProcessor {
    pub const NAME: &'static str = "blip_question";
    pub const DEFAULT_MAX_WORDS: usize = 50;

    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    /// Build from config key `max_words` (default 50).
    pub fn build(cfg: Option<&ProcessorConfig>) -> ProcessorResult<Self> {
        let empty = ProcessorConfig::default();
        let cfg = cfg.unwrap_or(&empty);

        let max_words: usize = cfg.get_or("max_words", Self::DEFAULT_MAX_WORDS)?;
        debug!("Building {} (max_words={})", Self::NAME, max_words);
        Ok(Self::new(max_words))
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Lower-case, delete punctuation, strip trailing spaces, truncate.
    pub fn pre_question(&self, question: &str) -> String {
        let lowered = question.to_lowercase();
        let stripped = PUNCTUATION.replace_all(&lowered, "");
        truncate_words(stripped.trim_end_matches(' '), self.max_words)
    }
}

impl Default for BlipQuestionProcessor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_WORDS)
    }
}

impl TextProcessor for BlipQuestionProcessor {
    fn process_text(&self, question: &str) -> String {
        self.pre_question(question)
    }
}

impl Processor for BlipQuestionProcessor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, input: ProcessorInput) -> ProcessorResult<ProcessorOutput> {
        let question = expect_text(input, Self::NAME)?;
        Ok(ProcessorOutput::Text(self.process_text(&question)))
    }
}
