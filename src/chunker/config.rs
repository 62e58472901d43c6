use serde::{Deserialize, Serialize};

use super::{ChunkError, DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS};

/// The two tunables of the chunker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Hard ceiling on tokens accumulated in one chunk
    pub max_token_count: usize,
    /// Minimum tokens re-included at the start of the next chunk
    pub overlap_tokens: usize,
}

impl ChunkerConfig {
    pub fn new(max_token_count: usize, overlap_tokens: usize) -> Self {
        Self {
            max_token_count,
            overlap_tokens,
        }
    }

    /// Reject configurations the chunker cannot run with
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.max_token_count == 0 {
            return Err(ChunkError::InvalidMaxTokens(self.max_token_count));
        }
        Ok(())
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS, DEFAULT_OVERLAP_TOKENS)
    }
}
