use std::ops::Range;

use serde::Serialize;
use tracing::debug;

use super::{ChunkError, ChunkerConfig, SentenceSplitter, TokenCounter};

/// A document handed to the chunker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable key naming the source document
    pub identifier: String,
    /// Full cleaned body text
    pub text: String,
}

impl Document {
    pub fn new(identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            text: text.into(),
        }
    }

    /// Build a document from a record whose text may be absent
    pub fn try_new(
        identifier: impl Into<String>,
        text: Option<String>,
    ) -> Result<Self, ChunkError> {
        let identifier = identifier.into();
        match text {
            Some(text) => Ok(Self { identifier, text }),
            None => Err(ChunkError::MissingText { identifier }),
        }
    }
}

/// A run of whole sentences ready for embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Identifier of the owning document, copied verbatim
    pub identifier: String,
    /// Sentences joined by a single space
    pub chunk_text: String,
    /// Metadata about the chunk
    pub metadata: ChunkMetadata,
}

/// Where a chunk sits in its document's sentence sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkMetadata {
    /// Sum of the token counts of the chunk's sentences
    pub token_count: usize,
    /// Index of the first sentence
    pub first_sentence: usize,
    /// Number of sentences in the chunk
    pub sentence_count: usize,
}

/// Sentence-aligned chunker with its segmentation capabilities
///
/// The splitter and counter are typically model-backed and expensive to
/// build, so a single `Chunker` is constructed once and shared by reference
/// across all documents (it is `Sync`).
pub struct Chunker {
    splitter: Box<dyn SentenceSplitter>,
    counter: Box<dyn TokenCounter>,
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a chunker, failing fast on an invalid configuration
    pub fn new(
        splitter: impl SentenceSplitter + 'static,
        counter: impl TokenCounter + 'static,
        config: ChunkerConfig,
    ) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self {
            splitter: Box::new(splitter),
            counter: Box::new(counter),
            config,
        })
    }

    /// Chunk one document with the configured limits
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        chunk_validated(
            document,
            self.splitter.as_ref(),
            self.counter.as_ref(),
            &self.config,
        )
    }
}

/// Chunk a document into token-bounded, overlapping runs of sentences
///
/// Returns an error only for `max_token_count == 0`; an empty document
/// yields no chunks.
pub fn chunk_document(
    document: &Document,
    splitter: &dyn SentenceSplitter,
    counter: &dyn TokenCounter,
    max_token_count: usize,
    overlap_tokens: usize,
) -> Result<Vec<Chunk>, ChunkError> {
    let config = ChunkerConfig::new(max_token_count, overlap_tokens);
    config.validate()?;
    Ok(chunk_validated(document, splitter, counter, &config))
}

fn chunk_validated(
    document: &Document,
    splitter: &dyn SentenceSplitter,
    counter: &dyn TokenCounter,
    config: &ChunkerConfig,
) -> Vec<Chunk> {
    // Blank sentences carry nothing to embed and would only produce empty chunks
    let sentences: Vec<String> = splitter
        .split(&document.text)
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();

    // Counted once; the window planner revisits sentences when it backs up
    let tokens: Vec<usize> = sentences.iter().map(|s| counter.count(s)).collect();

    let windows = plan_windows(&tokens, config.max_token_count, config.overlap_tokens);

    debug!(
        identifier = %document.identifier,
        sentences = sentences.len(),
        chunks = windows.len(),
        "chunked document"
    );

    windows
        .into_iter()
        .map(|window| Chunk {
            identifier: document.identifier.clone(),
            chunk_text: sentences[window.clone()].join(" "),
            metadata: ChunkMetadata {
                token_count: tokens[window.clone()].iter().sum(),
                first_sentence: window.start,
                sentence_count: window.len(),
            },
        })
        .collect()
}

/// Plan chunk boundaries over per-sentence token counts
///
/// Sentences are added while the running total stays below
/// `max_token_count`. The sentence that reaches the limit closes the chunk
/// without joining it, and the next chunk backs up over the closed chunk's
/// tail until more than `overlap_tokens` tokens are carried over. Every new
/// chunk starts strictly after the previous chunk's start, so at most
/// `tokens.len()` windows are produced.
pub fn plan_windows(
    tokens: &[usize],
    max_token_count: usize,
    overlap_tokens: usize,
) -> Vec<Range<usize>> {
    let mut windows = Vec::new();
    let mut start = 0;
    let mut cursor = 0;
    let mut running = 0usize;

    while cursor < tokens.len() {
        running = running.saturating_add(tokens[cursor]);
        if running < max_token_count {
            cursor += 1;
            continue;
        }

        if cursor == start {
            // A sentence that alone reaches the limit is kept whole
            windows.push(start..start + 1);
            start += 1;
        } else {
            windows.push(start..cursor);
            let resume = resume_point(tokens, start, cursor, overlap_tokens);
            start = if resume <= start { start + 1 } else { resume };
        }

        cursor = start;
        running = 0;
    }

    if start < tokens.len() {
        windows.push(start..tokens.len());
    }

    windows
}

/// Walk back from the end of the closed window `start..end` until the
/// carried tokens exceed `overlap_tokens` or the window start is reached.
fn resume_point(tokens: &[usize], start: usize, end: usize, overlap_tokens: usize) -> usize {
    let mut carried = 0usize;
    let mut resume = end;

    while resume > start {
        resume -= 1;
        carried = carried.saturating_add(tokens[resume]);
        if carried > overlap_tokens {
            break;
        }
    }

    resume
}
