mod config;
mod error;
mod window;


pub use config::ChunkerConfig;
pub use error::ChunkError;
pub use window::{Chunk, ChunkMetadata, Chunker, Document, chunk_document, plan_windows};

/// Token ceiling per chunk, the input limit of the embedding model
pub const DEFAULT_MAX_TOKENS: usize = 512;

/// Tokens carried over from the end of one chunk into the next
pub const DEFAULT_OVERLAP_TOKENS: usize = 50;

/// Sentence segmentation capability
///
/// Implementations must be deterministic and cover the whole input text
/// (ignoring whitespace), returning sentences in document order.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Per-sentence token counting capability
pub trait TokenCounter: Send + Sync {
    fn count(&self, sentence: &str) -> usize;
}
