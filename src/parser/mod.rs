mod error;
mod plain;
mod registry;
mod result;
mod tei;

#[cfg(test)]
mod tests;

pub use error::ParseError;
pub use plain::PlainTextParser;
pub use registry::ParserRegistry;
pub use result::RawRecord;
pub use tei::TeiParser;

/// Core trait that all record parsers must implement
pub trait RecordParser: Send + Sync {
    /// Extract the raw fields of one archival record
    ///
    /// # Arguments
    /// * `path` - Virtual path from the corpus (e.g., "1803/MM_1_01_RRB_1803_0001.xml")
    /// * `bytes` - Raw file contents from the arena
    fn parse(&self, path: &str, bytes: &[u8]) -> Result<RawRecord, ParseError>;
}
