use std::path::Path;

use thiserror::Error;
use tokenizers::Tokenizer;
use tracing::warn;

use crate::chunker::TokenCounter;

/// Average characters per subword token for European text
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Tokenizer of the German embedding model the chunks are sized for
pub const DEFAULT_HF_TOKENIZER: &str = "jinaai/jina-embeddings-v2-base-de";

#[derive(Error, Debug)]
#[error("Failed to load tokenizer {origin}: {message}")]
pub struct TokenizerLoadError {
    /// File path or model name
    pub origin: String,
    pub message: String,
}

/// Counts whitespace-separated words
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenCounter;

impl TokenCounter for WordTokenCounter {
    fn count(&self, sentence: &str) -> usize {
        sentence.split_whitespace().count()
    }
}

/// Estimates subword tokens from the character count
#[derive(Debug, Clone, Copy)]
pub struct CharRatioTokenCounter {
    chars_per_token: usize,
}

impl CharRatioTokenCounter {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for CharRatioTokenCounter {
    fn default() -> Self {
        Self::new(DEFAULT_CHARS_PER_TOKEN)
    }
}

impl TokenCounter for CharRatioTokenCounter {
    fn count(&self, sentence: &str) -> usize {
        sentence.chars().count().div_ceil(self.chars_per_token)
    }
}

/// Counts subword tokens with the embedding model's own tokenizer
///
/// Special tokens are not counted; the model adds them once per chunk,
/// not per sentence.
#[derive(Clone)]
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
    fallback: CharRatioTokenCounter,
}

impl HfTokenCounter {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            fallback: CharRatioTokenCounter::default(),
        }
    }

    /// Load a `tokenizer.json`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TokenizerLoadError> {
        let path = path.as_ref();
        Tokenizer::from_file(path)
            .map(Self::new)
            .map_err(|e| TokenizerLoadError {
                origin: path.display().to_string(),
                message: e.to_string(),
            })
    }

    /// Fetch a tokenizer from the Hugging Face hub (e.g., [`DEFAULT_HF_TOKENIZER`])
    pub fn from_pretrained(identifier: &str) -> Result<Self, TokenizerLoadError> {
        Tokenizer::from_pretrained(identifier, None)
            .map(Self::new)
            .map_err(|e| TokenizerLoadError {
                origin: identifier.to_string(),
                message: e.to_string(),
            })
    }
}

impl TokenCounter for HfTokenCounter {
    fn count(&self, sentence: &str) -> usize {
        match self.tokenizer.encode(sentence, false) {
            Ok(encoding) => encoding.len(),
            Err(e) => {
                warn!(error = %e, "tokenizer failed, estimating from characters");
                self.fallback.count(sentence)
            }
        }
    }
}
