use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("max_token_count must be positive, got {0}")]
    InvalidMaxTokens(usize),

    #[error("Document {identifier} has no text")]
    MissingText { identifier: String },
}
