use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty document: {0}")]
    Empty(String),

    #[error("No sourceDesc element in {0}")]
    MissingSourceDesc(String),

    #[error("Malformed XML in {path}: {message}")]
    Xml { path: String, message: String },
}
