use super::{ParseError, PlainTextParser, RawRecord, RecordParser, TeiParser};
use std::collections::BTreeMap;
use std::path::Path;

/// Record parsers keyed by file extension
///
/// Files without a registered extension are read as plain text.
pub struct ParserRegistry {
    fallback: Box<dyn RecordParser>,
    /// Lowercase extension without dot -> parser
    by_extension: BTreeMap<String, Box<dyn RecordParser>>,
}

impl ParserRegistry {
    /// Registry with only the plain-text fallback
    pub fn new() -> Self {
        Self {
            fallback: Box::new(PlainTextParser),
            by_extension: BTreeMap::new(),
        }
    }

    /// Registry reading `xml` files as TEI records
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("xml", TeiParser);
        registry
    }

    /// Register a parser for an extension (without dot, any case)
    pub fn register(&mut self, extension: impl Into<String>, parser: impl RecordParser + 'static) {
        self.by_extension
            .insert(extension.into().to_lowercase(), Box::new(parser));
    }

    /// The parser responsible for a corpus path
    pub fn select(&self, path: &str) -> &dyn RecordParser {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.by_extension.get(&ext.to_lowercase()))
            .map_or(&*self.fallback, |parser| &**parser)
    }

    /// Parse one corpus file with the parser responsible for its path
    pub fn parse(&self, path: &str, bytes: &[u8]) -> Result<RawRecord, ParseError> {
        self.select(path).parse(path, bytes)
    }

    /// Extensions with a dedicated parser, sorted
    ///
    /// Used as the default ingest filter, so only files some record
    /// format claims enter the corpus.
    pub fn extensions(&self) -> Vec<String> {
        self.by_extension.keys().cloned().collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
