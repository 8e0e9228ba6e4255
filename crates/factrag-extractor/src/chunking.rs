//! Chunking strategies: content in, fact strings out

use crate::config::{ChunkStrategy, ExtractorConfig};
use crate::error::ExtractorError;
use crate::parser::parse_marked_lines;
use crate::prompt::PromptSet;
use factrag_domain::traits::{ChatModel, Chunker};
use factrag_domain::ChatMessage;
use std::convert::Infallible;
use std::fmt::Display;
use tracing::debug;

/// Split text into paragraph-aligned windows of at most `max_chars` characters
///
/// Paragraphs (separated by blank lines) are combined until the limit; a
/// single paragraph longer than the limit is cut at character boundaries.
pub fn split_into_windows(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut windows = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in text.split("\n\n") {
        let len = paragraph.chars().count();

        if current_len + len + 2 > max_chars {
            if !current.trim().is_empty() {
                windows.push(current.trim().to_string());
            }
            current.clear();
            current_len = 0;

            if len > max_chars {
                windows.extend(split_at_char_limit(paragraph, max_chars));
                continue;
            }
        }

        current.push_str(paragraph);
        current.push_str("\n\n");
        current_len += len + 2;
    }

    if !current.trim().is_empty() {
        windows.push(current.trim().to_string());
    }

    windows
}

fn split_at_char_limit(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(limit).map(|chunk| chunk.iter().collect()).collect()
}

/// LLM-backed chunker
pub struct LlmChunker<L> {
    llm: L,
    prompts: PromptSet,
    marker: String,
    language: String,
    max_window_chars: usize,
}

impl<L> LlmChunker<L> {
    /// Create a chunker from the LLM-related parts of `config`
    pub fn new(llm: L, config: &ExtractorConfig) -> Self {
        Self {
            llm,
            prompts: config.prompts.clone(),
            marker: config.fact_marker.clone(),
            language: config.target_language.clone(),
            max_window_chars: config.max_window_chars,
        }
    }

    /// The underlying model
    pub fn llm(&self) -> &L {
        &self.llm
    }
}

impl<L> Chunker for LlmChunker<L>
where
    L: ChatModel,
    L::Error: Display,
{
    type Error = ExtractorError;

    fn chunk(&self, content: &str, topic: &str) -> Result<Vec<String>, ExtractorError> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let system = self
            .prompts
            .render_fact_system(topic, &self.language, &self.marker);
        let windows = split_into_windows(content, self.max_window_chars);
        debug!(windows = windows.len(), content_len = content.len(), "Chunking with LLM");

        let mut facts = Vec::new();
        for window in windows.iter().filter(|w| !w.trim().is_empty()) {
            let messages = [ChatMessage::system(system.as_str()), ChatMessage::user(window.as_str())];
            let response = self
                .llm
                .complete(&messages)
                .map_err(|e| ExtractorError::Llm(e.to_string()))?;
            debug!(response_len = response.len(), "LLM response");
            facts.extend(parse_marked_lines(&response, &self.marker));
        }
        Ok(facts)
    }
}

/// Deterministic line-based chunker
///
/// # Examples
///
/// ```
/// use factrag_domain::traits::Chunker;
/// use factrag_extractor::LineChunker;
///
/// let chunker = LineChunker::new(7);
/// let facts = chunker.chunk("  Exactly  \nshort\n", "any topic").unwrap();
/// assert_eq!(facts, vec!["Exactly"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChunker {
    min_length: usize,
}

impl LineChunker {
    /// Keep trimmed lines of at least `min_length` characters
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for LineChunker {
    fn default() -> Self {
        Self::new(7)
    }
}

impl Chunker for LineChunker {
    type Error = Infallible;

    fn chunk(&self, content: &str, _topic: &str) -> Result<Vec<String>, Infallible> {
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && line.chars().count() >= self.min_length)
            .map(str::to_string)
            .collect())
    }
}

/// A chunker selected by [`ChunkStrategy`]
pub enum ConfiguredChunker<L> {
    /// LLM-backed extraction
    Llm(LlmChunker<L>),
    /// Line-based extraction
    Lines(LineChunker),
}

impl<L> ConfiguredChunker<L> {
    /// Build the chunker named by `config.strategy`
    ///
    /// The model is dropped when the line strategy is selected.
    pub fn from_config(config: &ExtractorConfig, llm: L) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(match config.strategy {
            ChunkStrategy::Llm => ConfiguredChunker::Llm(LlmChunker::new(llm, config)),
            ChunkStrategy::Lines => ConfiguredChunker::Lines(LineChunker::new(config.min_line_length)),
        })
    }

    /// The selected strategy
    pub fn strategy(&self) -> ChunkStrategy {
        match self {
            ConfiguredChunker::Llm(_) => ChunkStrategy::Llm,
            ConfiguredChunker::Lines(_) => ChunkStrategy::Lines,
        }
    }
}

impl<L> Chunker for ConfiguredChunker<L>
where
    L: ChatModel,
    L::Error: Display,
{
    type Error = ExtractorError;

    fn chunk(&self, content: &str, topic: &str) -> Result<Vec<String>, ExtractorError> {
        match self {
            ConfiguredChunker::Llm(chunker) => chunker.chunk(content, topic),
            ConfiguredChunker::Lines(chunker) => match chunker.chunk(content, topic) {
                Ok(facts) => Ok(facts),
                Err(never) => match never {},
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factrag_llm::MockProvider;

    #[test]
    fn test_line_chunker_min_length_boundary() {
        let chunker = LineChunker::new(7);
        let content = "  exactly  \n  sixsix  \n1234567\n123456\n";
        // "exactly" = 7, "sixsix" = 6
        let facts = chunker.chunk(content, "").unwrap();
        assert_eq!(facts, vec!["exactly", "1234567"]);
    }

    #[test]
    fn test_line_chunker_counts_characters_not_bytes() {
        let chunker = LineChunker::new(7);
        // 6 characters, 12 bytes
        let facts = chunker.chunk("éééééé\nééééééé", "").unwrap();
        assert_eq!(facts, vec!["ééééééé"]);
    }

    #[test]
    fn test_line_chunker_empty_input() {
        assert!(LineChunker::default().chunk("", "topic").unwrap().is_empty());
        assert!(LineChunker::new(0).chunk("\n\n  \n", "topic").unwrap().is_empty());
    }

    #[test]
    fn test_llm_chunker_sends_rendered_prompt() {
        let llm = MockProvider::new("Facts:\n--- Nickel rose.\n--- Zinc fell 1%.\nDone.");
        let chunker = LlmChunker::new(llm.clone(), &ExtractorConfig::default());

        let facts = chunker.chunk("Some article text", "base metals").unwrap();

        assert_eq!(facts, vec!["Nickel rose.", "Zinc fell 1%."]);
        let messages = llm.last_messages();
        assert!(messages[0].content.contains("facts about base metals"));
        assert_eq!(messages[1].content, "Some article text");
    }

    #[test]
    fn test_llm_chunker_empty_content_skips_model() {
        let llm = MockProvider::new("--- should not appear");
        let chunker = LlmChunker::new(llm.clone(), &ExtractorConfig::default());
        assert!(chunker.chunk("   \n", "topic").unwrap().is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_llm_chunker_windows_long_content() {
        let llm = MockProvider::new("--- a fact");
        let config = ExtractorConfig {
            max_window_chars: 30,
            ..ExtractorConfig::default()
        };
        let chunker = LlmChunker::new(llm.clone(), &config);
        let content = "First paragraph is here.\n\nSecond paragraph is here.\n\nThird one.";

        let facts = chunker.chunk(content, "topic").unwrap();

        assert_eq!(llm.call_count(), 3);
        assert_eq!(facts.len(), 3);
    }

    #[test]
    fn test_llm_chunker_propagates_model_failure() {
        let llm = MockProvider::default();
        llm.queue_error("connection reset");
        let chunker = LlmChunker::new(llm, &ExtractorConfig::default());
        assert!(matches!(chunker.chunk("text", "topic"), Err(ExtractorError::Llm(_))));
    }

    #[test]
    fn test_llm_chunker_garbage_response_yields_nothing() {
        let llm = MockProvider::new("I cannot help with that.");
        let chunker = LlmChunker::new(llm, &ExtractorConfig::default());
        assert!(chunker.chunk("text", "topic").unwrap().is_empty());
    }

    #[test]
    fn test_configured_chunker_selects_strategy() {
        let lines = ConfiguredChunker::from_config(&ExtractorConfig::lines(), MockProvider::default()).unwrap();
        assert_eq!(lines.strategy(), ChunkStrategy::Lines);
        assert_eq!(lines.chunk("A long enough line\nshort", "t").unwrap(), vec!["A long enough line"]);

        let llm = ConfiguredChunker::from_config(&ExtractorConfig::default(), MockProvider::new("--- x fact")).unwrap();
        assert_eq!(llm.strategy(), ChunkStrategy::Llm);
        assert_eq!(llm.chunk("content", "t").unwrap(), vec!["x fact"]);
    }

    #[test]
    fn test_windows_small_text_unchanged() {
        assert_eq!(split_into_windows("short", 100), vec!["short"]);
    }

    #[test]
    fn test_windows_split_long_paragraph() {
        let windows = split_into_windows(&"x".repeat(25), 10);
        assert_eq!(windows, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: no window exceeds the limit
        #[test]
        fn test_windows_respect_limit(text in "[a-zé \n]{0,400}", limit in 1usize..80) {
            for window in split_into_windows(&text, limit) {
                prop_assert!(window.chars().count() <= limit);
            }
        }

        /// Property: kept lines are trimmed and at least min_length long
        #[test]
        fn test_line_chunker_output(text in "[a-z \n\t]{0,300}", min in 0usize..12) {
            let facts = LineChunker::new(min).chunk(&text, "").unwrap();
            for fact in facts {
                prop_assert_eq!(fact.trim(), fact.as_str());
                prop_assert!(fact.chars().count() >= min);
                prop_assert!(!fact.is_empty());
            }
        }
    }
}
