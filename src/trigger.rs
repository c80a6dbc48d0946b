//! Trigger detection
//!
//! The trigger word is the longest run of ASCII word characters
//! (`[A-Za-z0-9_]`) ending exactly at the caret. Detection is stateless and
//! is recomputed from scratch after every edit or caret move.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::Document;

static TRAILING_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+$").unwrap());

/// Trigger word at the end of `before_caret`, if any
pub fn trailing_word(before_caret: &str) -> Option<&str> {
    TRAILING_WORD
        .find(before_caret)
        .map(|m| m.as_str())
        .filter(|word| !word.is_empty())
}

/// Trigger word immediately before the document's caret
pub fn detect(document: &Document) -> Option<&str> {
    trailing_word(document.text_before_caret())
}
