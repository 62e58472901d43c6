use std::collections::HashSet;

use crate::chunker::SentenceSplitter;

/// Abbreviations that end in a period without ending the sentence
///
/// Stored lowercase without the final period.
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "abs", "art", "bd", "betr", "bez", "bzw", "ca", "d.h", "d.i", "dgl", "dr", "etc", "evtl",
    "fl", "fol", "fr", "geb", "gem", "gest", "ggf", "hr", "hrn", "hrsg", "inkl", "insb", "jh",
    "jun", "kt", "lit", "lt", "mio", "mrd", "nr", "pag", "prof", "resp", "rp", "s", "sel", "sen",
    "sog", "sr", "st", "u.a", "u.s.w", "usw", "v", "vgl", "z.b", "ziff",
];

/// Punctuation-driven sentence splitter
///
/// A sentence ends at `.`, `!` or `?` (plus any closing quotes or brackets)
/// when followed by whitespace and a character that can open a sentence.
/// Periods after known abbreviations, single-letter initials and one- or
/// two-digit numerals (ordinals, day numbers) do not end a sentence. Longer
/// numbers such as years do.
#[derive(Debug, Clone)]
pub struct RuleSentenceSplitter {
    abbreviations: HashSet<String>,
}

impl RuleSentenceSplitter {
    pub fn new() -> Self {
        Self::with_abbreviations(DEFAULT_ABBREVIATIONS.iter().copied())
    }

    /// Create a splitter with a custom abbreviation list
    pub fn with_abbreviations<I, S>(abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            abbreviations: abbreviations
                .into_iter()
                .map(|a| normalize_abbreviation(a.as_ref()))
                .collect(),
        }
    }

    /// Register an additional abbreviation (with or without trailing period)
    pub fn add_abbreviation(&mut self, abbreviation: &str) {
        self.abbreviations
            .insert(normalize_abbreviation(abbreviation));
    }

    /// Decide whether the terminator after `before` ends a sentence when
    /// `next` is the first character of the following word
    fn is_boundary(&self, before: &str, terminator: char, next: char) -> bool {
        if !(next.is_uppercase() || next.is_ascii_digit() || is_opener(next)) {
            return false;
        }
        if terminator != '.' {
            return true;
        }

        let word = before
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("")
            .trim_start_matches(|c: char| is_opener(c) || c == '-');

        if word.is_empty() {
            return true;
        }
        if is_ordinal(word) {
            return false;
        }
        let mut letters = word.chars();
        if let (Some(first), None) = (letters.next(), letters.next()) {
            if first.is_alphabetic() {
                return false;
            }
        }

        !self.abbreviations.contains(&normalize_abbreviation(word))
    }
}

impl Default for RuleSentenceSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSplitter for RuleSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (pos, c) = chars[i];
            if !is_terminator(c) {
                i += 1;
                continue;
            }

            let mut after = i + 1;
            while after < chars.len()
                && (is_terminator(chars[after].1) || is_closer(chars[after].1))
            {
                after += 1;
            }
            if after >= chars.len() {
                break;
            }
            if !chars[after].1.is_whitespace() {
                i = after;
                continue;
            }

            let mut next = after;
            while next < chars.len() && chars[next].1.is_whitespace() {
                next += 1;
            }
            if next >= chars.len() {
                break;
            }

            if self.is_boundary(&text[start..pos], c, chars[next].1) {
                push_trimmed(&mut sentences, &text[start..chars[after].0]);
                start = chars[next].0;
            }
            i = next;
        }

        push_trimmed(&mut sentences, &text[start..]);
        sentences
    }
}

fn push_trimmed(sentences: &mut Vec<String>, sentence: &str) {
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
}

fn normalize_abbreviation(abbreviation: &str) -> String {
    abbreviation.trim().trim_end_matches('.').to_lowercase()
}

/// Day numbers and ordinals: one or two digits
fn is_ordinal(word: &str) -> bool {
    (1..=2).contains(&word.len()) && word.chars().all(|c| c.is_ascii_digit())
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '»' | '“' | '”' | '’')
}

fn is_opener(c: char) -> bool {
    matches!(c, '"' | '\'' | '(' | '[' | '«' | '„' | '‘')
}
