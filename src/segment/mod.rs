//! Rule-based sentence segmentation and token counting
//!
//! The rule-based splitter and the word and character counters are
//! deterministic stand-ins; [`HfTokenCounter`] counts with the embedding
//! model's tokenizer. Anything implementing [`SentenceSplitter`] or
//! [`TokenCounter`] can replace them.
//!
//! [`SentenceSplitter`]: crate::chunker::SentenceSplitter
//! [`TokenCounter`]: crate::chunker::TokenCounter

mod sentence;
mod tokens;


pub use sentence::{DEFAULT_ABBREVIATIONS, RuleSentenceSplitter};
pub use tokens::{
    CharRatioTokenCounter, DEFAULT_CHARS_PER_TOKEN, DEFAULT_HF_TOKENIZER, HfTokenCounter,
    TokenizerLoadError, WordTokenCounter,
};
