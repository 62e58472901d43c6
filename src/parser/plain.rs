use super::{ParseError, RawRecord, RecordParser};

/// Fallback parser: the whole file is the record text
pub struct PlainTextParser;

impl RecordParser for PlainTextParser {
    fn parse(&self, path: &str, bytes: &[u8]) -> Result<RawRecord, ParseError> {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            // Binary or invalid UTF-8: extract printable ASCII
            Err(_) => Self::extract_printable(bytes),
        };

        if text.trim().is_empty() {
            return Err(ParseError::Empty(path.to_string()));
        }

        let mut record = RawRecord::for_path(path);
        record.text = Some(text);
        Ok(record)
    }
}

impl PlainTextParser {
    /// Extract printable ASCII from binary data
    fn extract_printable(bytes: &[u8]) -> String {
        bytes
            .iter()
            .filter(|&&b| b.is_ascii_graphic() || b.is_ascii_whitespace())
            .map(|&b| b as char)
            .collect()
    }
}
