//! Grounding prompts for summaries and answers.
//!
//! The composer is pure: it only formats strings and never calls a service.
//! Both prompts name an exact JSON shape so that
//! [`reply`](crate::reply) can parse the model output deterministically.

use crate::document::Chunk;
use crate::language::{Language, LanguageProfile};
use crate::reply::{MAX_BREAKDOWN, MAX_KEY_FACTS, MAX_KEY_POINTS, MAX_NEXT_STEPS, MAX_WARNINGS};
use crate::text::{char_len, truncate_chars};

/// Separator placed between retrieved chunks in an answer prompt.
pub const CONTEXT_SEPARATOR: &str = "\n\n-----\n\n";

const ASSISTANT_ROLE: &str = "You are TrustDocs, an assistant that helps people understand \
complex legal, financial, and medical documents. Your readers may have cognitive disabilities, \
low literacy, or limited proficiency in the document's language. Be transparent, accurate, and \
helpful: focus on obligations, rights, risks, costs, and deadlines, and avoid jargon.";

/// Builds the prompts sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptComposer {
    max_document_chars: usize,
}

impl PromptComposer {
    /// Create a composer that includes at most `max_document_chars`
    /// characters of document text in summary prompts.
    pub fn new(max_document_chars: usize) -> Self {
        Self { max_document_chars }
    }

    /// The document truncation limit.
    pub fn max_document_chars(&self) -> usize {
        self.max_document_chars
    }

    /// Prompt asking for a `{introduction, keyPoints, warnings, nextSteps}` summary.
    pub fn compose_summary_prompt(&self, document_text: &str, language: Language) -> String {
        let profile = language.profile();
        let excerpt = truncate_chars(document_text, self.max_document_chars);
        let truncation_note = if char_len(document_text) > self.max_document_chars {
            format!(
                "\nNote: only the first {} characters of the document are shown below.\n",
                self.max_document_chars
            )
        } else {
            String::new()
        };

        format!(
            "{ASSISTANT_ROLE}

TASK: Read the document and identify the things a person most needs to know before signing or \
agreeing to it: key obligations, important dates and deadlines, costs and fees, rights given up \
or gained, penalties, cancellation or auto-renewal terms, and hidden risks or unfavorable terms.
Use only information found in the document. If something important is missing or unclear, say \
so instead of guessing.
{truncation_note}
DOCUMENT:
{excerpt}

{language_rules}

{format_rules}",
            language_rules = language_rules(profile),
            format_rules = summary_format_rules(),
        )
    }

    /// Prompt asking for a `{simpleAnswer, breakdown, keyFacts}` answer grounded
    /// in `context`.
    pub fn compose_answer_prompt(
        &self,
        question: &str,
        context: &[Chunk],
        language: Language,
    ) -> String {
        let profile = language.profile();
        let context_block = if context.is_empty() {
            "(no matching passages were found)".to_string()
        } else {
            context
                .iter()
                .map(|chunk| format!("[{}]\n{}", chunk.id, chunk.text.trim()))
                .collect::<Vec<_>>()
                .join(CONTEXT_SEPARATOR)
        };

        format!(
            "{ASSISTANT_ROLE}

CONTEXT: The passages below were taken from the user's document. Passages are separated by a \
line of dashes and start with their identifier in square brackets.

{context_block}

USER QUESTION: {question}

RULES:
1. Base your answer ONLY on the passages above. Do not use outside knowledge.
2. If the passages do not contain the answer, set \"simpleAnswer\" to exactly: \"{not_found}\" \
and leave the lists empty. Never invent an answer.
3. Be specific about what the user needs to know or do, and state warnings clearly.
4. Mention which passage identifiers support each fact.

{language_rules}

{format_rules}",
            not_found = profile.not_found,
            language_rules = language_rules(profile),
            format_rules = answer_format_rules(),
        )
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(crate::config::RagConfig::default().max_document_chars)
    }
}

fn language_rules(profile: &LanguageProfile) -> String {
    format!(
        "LANGUAGE: Write every string value in {name}. {register}",
        name = profile.name,
        register = profile.register
    )
}

fn summary_format_rules() -> String {
    format!(
        "OUTPUT FORMAT: Return ONLY one valid JSON object with exactly this shape, no markdown and \
no text before or after it:
{{
  \"introduction\": \"one or two sentences saying what this document is\",
  \"keyPoints\": [\"at most {MAX_KEY_POINTS} short, specific, actionable points\"],
  \"warnings\": [\"at most {MAX_WARNINGS} risks, penalties, or unfavorable terms\"],
  \"nextSteps\": [\"at most {MAX_NEXT_STEPS} things the reader should do or check\"]
}}"
    )
}

fn answer_format_rules() -> String {
    format!(
        "OUTPUT FORMAT: Return ONLY one valid JSON object with exactly this shape, no markdown and \
no text before or after it:
{{
  \"simpleAnswer\": \"a short, direct answer to the question\",
  \"breakdown\": [\"at most {MAX_BREAKDOWN} simple explanation steps\"],
  \"keyFacts\": [\"at most {MAX_KEY_FACTS} facts quoted or paraphrased from the passages\"]
}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkId;

    fn chunk(id: usize, text: &str) -> Chunk {
        Chunk { id: ChunkId(id), text: text.into(), offset: 0 }
    }

    #[test]
    fn summary_prompt_truncates_document() {
        let composer = PromptComposer::new(10);
        let prompt = composer.compose_summary_prompt("0123456789ABCDEF", Language::English);
        assert!(prompt.contains("0123456789"));
        assert!(!prompt.contains("ABCDEF"));
        assert!(prompt.contains("only the first 10 characters"));
    }

    #[test]
    fn summary_prompt_without_truncation_has_no_note() {
        let prompt = PromptComposer::new(100).compose_summary_prompt("short", Language::English);
        assert!(prompt.contains("short"));
        assert!(!prompt.contains("only the first"));
        assert!(prompt.contains("\"keyPoints\""));
        assert!(prompt.contains("\"nextSteps\""));
    }

    #[test]
    fn answer_prompt_separates_context_chunks() {
        let composer = PromptComposer::default();
        let context = vec![chunk(2, "Late fee is $25."), chunk(0, "Payment is due monthly.")];
        let prompt =
            composer.compose_answer_prompt("What is the late fee?", &context, Language::English);

        assert!(prompt.contains("[chunk_2]\nLate fee is $25."));
        assert!(prompt.contains(&format!("Late fee is $25.{CONTEXT_SEPARATOR}[chunk_0]")));
        assert!(prompt.contains("USER QUESTION: What is the late fee?"));
        assert!(prompt.contains("\"simpleAnswer\""));
    }

    #[test]
    fn answer_prompt_requires_explicit_absence_statement() {
        let prompt = PromptComposer::default().compose_answer_prompt("Q?", &[], Language::Spanish);
        assert!(prompt.contains(Language::Spanish.profile().not_found));
        assert!(prompt.contains("Write every string value in Spanish"));
        assert!(prompt.contains("no matching passages"));
    }

    #[test]
    fn composing_is_deterministic() {
        let composer = PromptComposer::default();
        let context = vec![chunk(1, "text")];
        assert_eq!(
            composer.compose_answer_prompt("q", &context, Language::German),
            composer.compose_answer_prompt("q", &context, Language::German)
        );
    }
}
