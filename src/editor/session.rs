//! Per-editor session state
//!
//! Each editor owns one of each of these; nothing here is shared between
//! editors.

use std::collections::HashMap;

use crate::document::Document;
use crate::trigger;

/// Autocomplete session driven by the trigger word before the caret
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionSession {
    search_term: String,
    active: bool,
}

impl SuggestionSession {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Recompute from the document. Returns whether the session is active.
    pub fn refresh(&mut self, document: &Document) -> bool {
        match trigger::detect(document) {
            Some(word) => {
                self.search_term.clear();
                self.search_term.push_str(word);
                self.active = true;
            }
            None => self.deactivate(),
        }
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.search_term.clear();
    }
}

/// Names tags had when their id was first inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalNames {
    names: HashMap<String, String>,
}

impl OriginalNames {
    /// Record `name` for `id` unless one is already known. Returns whether it
    /// was recorded.
    pub fn record(&mut self, id: &str, name: &str) -> bool {
        if self.names.contains_key(id) {
            return false;
        }
        self.names.insert(id.to_string(), name.to_string());
        true
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
