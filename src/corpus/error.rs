use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read corpus: {0}")]
    ReadFailed(String),

    #[error("Failed to parse ZIP archive: {0}")]
    ZipParseFailed(String),

    #[error("Invalid path in corpus: {0}")]
    InvalidPath(String),

    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },
}
