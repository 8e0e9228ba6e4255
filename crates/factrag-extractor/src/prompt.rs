//! Prompt templates used for fact extraction and question answering

use serde::{Deserialize, Serialize};

/// Named prompt templates
///
/// `fact_system` supports the placeholders `{topic}`, `{language}` and
/// `{marker}`. Variants are plain values, so tests and callers can build
/// their own without touching shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSet {
    /// System prompt for the LLM chunker
    pub fact_system: String,

    /// System prompt for answering questions from retrieved facts
    pub question_system: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            fact_system: FACT_SYSTEM.to_string(),
            question_system: QUESTION_SYSTEM.to_string(),
        }
    }
}

impl PromptSet {
    /// Fill in the fact extraction prompt
    pub fn render_fact_system(&self, topic: &str, language: &str, marker: &str) -> String {
        // Marker goes in last so a topic containing "{marker}" stays literal
        self.fact_system
            .replace("{topic}", topic)
            .replace("{language}", language)
            .replace("{marker}", marker.trim_end())
    }

    /// Check that required placeholders are present
    pub fn validate(&self) -> Result<(), String> {
        if !self.fact_system.contains("{topic}") {
            return Err("fact_system prompt must contain {topic}".to_string());
        }
        if self.question_system.trim().is_empty() {
            return Err("question_system prompt must not be empty".to_string());
        }
        Ok(())
    }
}

const FACT_SYSTEM: &str = r#"You are a researcher helping extract facts about {topic}, trends, and related observations. We will give you a piece of content scraped on the web. Please extract facts from this. Each fact should stand on its own, and can be several sentences long if need be. You can have as many facts as needed. For each fact, please start it as a new line with "{marker}" as the bullet point. For example:

{marker} Fact 1... This is the fact.
{marker} Here is a second fact.
{marker} And a third fact.

Please do not include new lines between bullet points. Make sure you write your facts in {language}. Translate any foreign language content/facts/observations into {language}.

We will simply provide you with content and you will just provide facts."#;

const QUESTION_SYSTEM: &str = r#"You are a research agent that answers questions about specific points and topics. Every fact you reference must come from the information we provide. We will provide a knowledge base below, where each fact is preceded by an ID (e.g., f1, f2). Base your answers on these facts ONLY.

For example, suppose we ask 'Who chairs the central bank?' and provide:

f1: The central bank is chaired by Jane Doe.
f2: The central bank meets eight times a year.

Your answer should look like this:

The central bank is chaired by Jane Doe [f1].

We give you a list of facts with every question. Reference those facts with square brackets and the fact ID, so [f123] for fact 123; you may also reference earlier facts from this conversation. Do not use any other information."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts_are_valid() {
        assert!(PromptSet::default().validate().is_ok());
    }

    #[test]
    fn test_render_fact_system() {
        let prompt = PromptSet::default().render_fact_system("copper prices", "ENGLISH", "--- ");
        assert!(prompt.contains("facts about copper prices,"));
        assert!(prompt.contains("\n--- Here is a second fact."));
        assert!(prompt.contains("write your facts in ENGLISH"));
        assert!(!prompt.contains("{topic}"));
        assert!(!prompt.contains("{marker}"));
    }

    #[test]
    fn test_custom_prompt_without_topic_rejected() {
        let prompts = PromptSet {
            fact_system: "List facts.".to_string(),
            ..PromptSet::default()
        };
        assert!(prompts.validate().is_err());
    }
}
