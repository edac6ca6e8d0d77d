//! Deterministic providers for tests and offline runs.
//!
//! [`MockEmbedder`] hashes words into a fixed-size bag-of-words vector, so
//! texts that share words score high under cosine similarity.
//! [`MockCompletion`] replays scripted replies and records every prompt.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::completion::{Completion, CompletionProvider};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const DEFAULT_DIMENSIONS: usize = 64;

/// Hash-based bag-of-words embedder.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent call fail with [`RagError::Upstream`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of texts embedded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let bucket = fnv1a(&word.to_lowercase()) as usize % self.dimensions;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RagError::upstream("mock", "embedding service unavailable"));
        }
        Ok(self.vectorize(text))
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Scripted completion provider.
///
/// Queued replies are returned in order; once the queue is empty every call
/// returns the default reply.
#[derive(Debug)]
pub struct MockCompletion {
    default_reply: String,
    queue: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            default_reply: default_reply.into(),
            queue: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue one reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue one request failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(RagError::upstream("mock", message.into())));
        self
    }

    /// Queue one reply on a shared instance.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.push(Ok(reply.into()));
    }

    /// Number of completion requests received.
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    /// Every prompt received, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn push(&self, reply: Result<String>) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(reply);
        }
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> Result<Completion> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let next = self.queue.lock().ok().and_then(|mut queue| queue.pop_front());
        match next {
            Some(reply) => reply.map(Completion::new),
            None => Ok(Completion::new(self.default_reply.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cosine_similarity;

    #[tokio::test]
    async fn shared_words_score_higher() {
        let embedder = MockEmbedder::new(256);
        let query = embedder.embed("late fee").await.unwrap();
        let related = embedder.embed("A late fee of $25 applies.").await.unwrap();
        let unrelated = embedder.embed("Tenant may keep one cat.").await.unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test]
    async fn embedder_can_fail() {
        let embedder = MockEmbedder::default();
        embedder.set_failing(true);
        assert!(matches!(embedder.embed("x").await, Err(RagError::Upstream { .. })));
    }

    #[tokio::test]
    async fn completion_replays_queue_then_default() {
        let completion = MockCompletion::new("default").with_reply("first").with_failure("down");

        assert_eq!(completion.complete("a").await.unwrap().text, "first");
        assert!(completion.complete("b").await.is_err());
        assert_eq!(completion.complete("c").await.unwrap().text, "default");
        assert_eq!(completion.prompts(), vec!["a", "b", "c"]);
        assert_eq!(completion.calls(), 3);
    }
}
