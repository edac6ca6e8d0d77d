//! Turns prompts into structured replies via the completion service.
//!
//! Every call makes exactly one completion request. Request failures and
//! unparseable replies never reach the caller: they degrade to a
//! deterministic fallback and are logged at `warn` level.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::completion::CompletionProvider;
use crate::document::Chunk;
use crate::language::Language;
use crate::prompt::PromptComposer;
use crate::reply::{AnswerReply, StructuredReply, SummaryReply};

/// Composes prompts, calls the completion service and validates the reply.
pub struct ResponseSynthesizer {
    completion: Arc<dyn CompletionProvider>,
    composer: PromptComposer,
    answer_fallback_chars: usize,
}

impl ResponseSynthesizer {
    /// Create a synthesizer.
    ///
    /// `answer_fallback_chars` bounds the raw reply prefix used when an
    /// answer cannot be parsed.
    pub fn new(
        completion: Arc<dyn CompletionProvider>,
        composer: PromptComposer,
        answer_fallback_chars: usize,
    ) -> Self {
        Self { completion, composer, answer_fallback_chars }
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Summarise `document_text` in `language`.
    pub async fn summarize(&self, document_text: &str, language: Language) -> SummaryReply {
        let prompt = self.composer.compose_summary_prompt(document_text, language);
        self.synthesize(&prompt, language, |_| SummaryReply::fallback(language)).await
    }

    /// Answer `question` from the retrieved `context` in `language`.
    pub async fn answer(
        &self,
        question: &str,
        context: &[Chunk],
        language: Language,
    ) -> AnswerReply {
        let prompt = self.composer.compose_answer_prompt(question, context, language);
        let max_chars = self.answer_fallback_chars;
        self.synthesize(&prompt, language, |raw| AnswerReply::fallback(raw, language, max_chars))
            .await
    }

    async fn synthesize<T, F>(&self, prompt: &str, language: Language, fallback: F) -> T
    where
        T: StructuredReply,
        F: FnOnce(Option<&str>) -> T,
    {
        let provider = self.completion.name();
        debug!(provider, kind = T::KIND, prompt_len = prompt.len(), "requesting completion");

        let completion = match self.completion.complete(prompt).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(provider, kind = T::KIND, error = %e, "completion failed, using fallback");
                return fallback(None);
            }
        };

        match T::parse(&completion.text, language) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    provider,
                    kind = T::KIND,
                    error = %e,
                    reply_len = completion.text.len(),
                    "unparseable completion, using fallback"
                );
                fallback(Some(&completion.text))
            }
        }
    }
}
