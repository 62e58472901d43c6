// Public API exports
pub mod bundle;
pub mod chunker;
pub mod clean;
pub mod corpus;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod security;
pub mod segment;
pub mod store;

// Re-export main types for convenience
pub use corpus::{Corpus, CorpusBuilder, CorpusError, FileEntry, IngestOptions, SkippedFile};
pub use security::PathSanitizer;

pub use parser::{
    ParseError, ParserRegistry, PlainTextParser, RawRecord, RecordParser, TeiParser,
};

pub use normalize::{ArchivalRecord, RRB_SERIES, normalize};

pub use clean::TextCleaner;

pub use chunker::{
    Chunk, ChunkError, ChunkMetadata, Chunker, ChunkerConfig, DEFAULT_MAX_TOKENS,
    DEFAULT_OVERLAP_TOKENS, Document, SentenceSplitter, TokenCounter, chunk_document,
};

pub use segment::{
    CharRatioTokenCounter, HfTokenCounter, RuleSentenceSplitter, TokenizerLoadError,
    WordTokenCounter,
};

pub use pipeline::{
    Failure, IndexRecord, Pipeline, PipelineOutput, PipelineReport, ProcessedRecord,
};

pub use store::{ChunkStore, StoreStats};

pub use bundle::{BundleWriter, Manifest, write_jsonl};
