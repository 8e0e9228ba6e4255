//! FactBot: multi-turn question answering over the fact store

use crate::citation::CitationResolver;
use crate::config::SynthesizerConfig;
use crate::error::SynthError;
use factrag_domain::traits::{ChatModel, EmbeddingModel};
use factrag_domain::ChatMessage;
use factrag_extractor::PromptSet;
use factrag_store::{FactStore, QueryLimit};
use std::fmt::Display;
use tracing::{debug, info};

/// Answers questions from retrieved facts, keeping the conversation
///
/// Every question is prefixed with the nearest facts (`f<n>: ...` lines) so
/// the model can cite them as `[f<n>]`. The history holds the messages as
/// sent, so follow-up questions see earlier context.
pub struct FactBot<'a, L, E> {
    store: &'a FactStore<E>,
    llm: L,
    resolver: CitationResolver,
    limit: QueryLimit,
    clean_sources: bool,
    history: Vec<ChatMessage>,
}

impl<'a, L, E> FactBot<'a, L, E>
where
    L: ChatModel,
    L::Error: Into<SynthError>,
    E: EmbeddingModel,
    E::Error: Display,
{
    /// Create a bot with the default prompts and settings
    pub fn new(store: &'a FactStore<E>, llm: L) -> Result<Self, SynthError> {
        Self::with_config(store, llm, &PromptSet::default(), &SynthesizerConfig::default())
    }

    /// Create a bot from prompts and configuration
    pub fn with_config(
        store: &'a FactStore<E>,
        llm: L,
        prompts: &PromptSet,
        config: &SynthesizerConfig,
    ) -> Result<Self, SynthError> {
        config.validate().map_err(SynthError::Config)?;
        Ok(Self {
            store,
            llm,
            resolver: CitationResolver::new(config.style)?,
            limit: QueryLimit::from_n_results(config.facts_per_question),
            clean_sources: config.clean_sources,
            history: vec![ChatMessage::system(prompts.question_system.clone())],
        })
    }

    /// Ask a question
    ///
    /// With `clean_sources` on, fact references in the answer are resolved
    /// to numbered sources; an answer citing an unknown fact is an error.
    /// On failure the question is not added to the history.
    pub fn ask(&mut self, question: &str) -> Result<String, SynthError> {
        let context = self.store.query_to_fact_content(question, self.limit, None, false)?;
        let message = format!("{}\n\n{}", context, question);
        debug!(context_len = context.len(), "Asking with retrieved facts");

        self.history.push(ChatMessage::user(message));
        let response = match self.llm.complete(&self.history) {
            Ok(response) => response,
            Err(e) => {
                self.history.pop();
                return Err(e.into());
            }
        };
        let answer = if self.clean_sources {
            match self.resolver.resolve_text(&response, self.store) {
                Ok(answer) => answer,
                Err(e) => {
                    self.history.pop();
                    return Err(e);
                }
            }
        } else {
            response.clone()
        };
        self.history.push(ChatMessage::assistant(response));
        info!(turns = self.turns(), "FactBot answered");
        Ok(answer)
    }

    /// Source URI of a fact
    pub fn source(&self, fact_id: &str) -> Result<String, SynthError> {
        Ok(self.store.get_fact_source(fact_id)?)
    }
}

impl<L, E> FactBot<'_, L, E> {
    /// Messages exchanged so far, system prompt first
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Number of answered questions
    pub fn turns(&self) -> usize {
        self.history.len().saturating_sub(1) / 2
    }

    /// Drop the conversation, keeping the system prompt
    pub fn reset(&mut self) {
        self.history.truncate(1);
    }

    /// The chat model
    pub fn llm(&self) -> &L {
        &self.llm
    }
}
