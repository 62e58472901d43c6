use regex::Regex;

/// Control characters, non-breaking spaces and escape leftovers from OCR
const ESCAPE_SEQS: &str = concat!(
    r"\x04|\x1a|\xa0|\x00|\x{e83a}|\x19|\x{f06c}|\x10|\x17|\x13|\x11|",
    r"<space>|\x16|\x18|\x1b|\x15|\t\b|\f",
);

const PUNCTUATION: &str = r"[;«»„“:()\[\]]";

const MULTIPLE_DOTS: &str = r"\.{2,}";

/// Section numbering `I.` to `XV.` standing alone between whitespace
const ROMAN_NUMERALS: &str =
    r"(\s)(?:XV|XIV|XIII|XII|XI|X|IX|VIII|VII|VI|V|IV|III|II|I)\.(\s)";

/// Surface cleanup applied to record text before chunking
///
/// Compiled once and shared; cleaning is a pure string-to-string filter.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    escapes: Regex,
    punctuation: Regex,
    dots: Regex,
    roman_numerals: Regex,
}

impl TextCleaner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            escapes: Regex::new(ESCAPE_SEQS)?,
            punctuation: Regex::new(PUNCTUATION)?,
            dots: Regex::new(MULTIPLE_DOTS)?,
            roman_numerals: Regex::new(ROMAN_NUMERALS)?,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        let text = text.trim();
        let text = self.escapes.replace_all(text, " ");
        let text = self.punctuation.replace_all(&text, " ");
        let text = self.dots.replace_all(&text, " ");

        let mut text = text.into_owned();
        // Adjacent numerals share their separating whitespace, so repeat
        while self.roman_numerals.is_match(&text) {
            text = self.roman_numerals.replace_all(&text, "${1} ${2}").into_owned();
        }

        let text = text
            .replace('&', " und ")
            .replace('§', " Paragraph ")
            .replace('=', " gleich ");

        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
