//! Suggestion catalog
//!
//! The catalog is the read-only list of entities a user can insert as tags.
//! It is supplied once by an external source (see [`source`]) and treated as a
//! static snapshot for the lifetime of an editor. Until a source resolves, an
//! editor works against [`Catalog::empty`], so suggestion sessions simply find
//! nothing.
//!
//! Each [`Suggestion`] carries a `value` that may arrive as a JSON number or as a
//! string. [`SuggestionValue::as_number`] coerces it for evaluation; anything that
//! does not read as a finite number counts as `0`.

pub mod filter;
pub mod source;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use filter::filter_by_category;
pub use source::{spawn_fetch, CatalogError, CatalogSource};

/// An insertable entity as delivered by the catalog source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub category: String,
    pub value: SuggestionValue,
}

impl Suggestion {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        value: impl Into<SuggestionValue>,
    ) -> Self {
        Suggestion {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            value: value.into(),
        }
    }
}

/// Raw catalog value, either numeric or textual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionValue {
    Number(f64),
    Text(String),
}

impl SuggestionValue {
    /// Numeric reading of the value.
    ///
    /// Text is trimmed first; an empty string reads as `0`. Values that do not
    /// parse, or parse to NaN or an infinity, also read as `0`.
    pub fn as_number(&self) -> f64 {
        let number = match self {
            SuggestionValue::Number(n) => *n,
            SuggestionValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(0.0)
                }
            }
        };

        if number.is_finite() {
            number
        } else {
            0.0
        }
    }
}

impl From<f64> for SuggestionValue {
    fn from(value: f64) -> Self {
        SuggestionValue::Number(value)
    }
}

impl From<i32> for SuggestionValue {
    fn from(value: i32) -> Self {
        SuggestionValue::Number(f64::from(value))
    }
}

impl From<&str> for SuggestionValue {
    fn from(value: &str) -> Self {
        SuggestionValue::Text(value.to_string())
    }
}

impl From<String> for SuggestionValue {
    fn from(value: String) -> Self {
        SuggestionValue::Text(value)
    }
}

impl fmt::Display for SuggestionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionValue::Number(n) => write!(f, "{}", n),
            SuggestionValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Immutable, cheaply clonable snapshot of the suggestion list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    suggestions: Arc<Vec<Suggestion>>,
}

impl Catalog {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Catalog {
            suggestions: Arc::new(suggestions),
        }
    }

    /// The catalog used before the source has resolved
    pub fn empty() -> Self {
        Catalog::default()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter()
    }

    pub fn as_slice(&self) -> &[Suggestion] {
        self.suggestions.as_slice()
    }

    /// First suggestion with the given id, in catalog order
    pub fn get(&self, id: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.id == id)
    }

    /// Suggestions whose category contains `term`, ignoring case
    pub fn filter(&self, term: &str) -> Vec<&Suggestion> {
        filter_by_category(self.as_slice(), term)
    }

    /// Numeric value per id, used when a document is serialized for evaluation.
    ///
    /// When ids repeat, the later entry wins.
    pub fn value_lookup(&self) -> ValueLookup {
        let values = self
            .suggestions
            .iter()
            .map(|s| (s.id.clone(), s.value.as_number()))
            .collect();
        ValueLookup { values }
    }
}

impl From<Vec<Suggestion>> for Catalog {
    fn from(suggestions: Vec<Suggestion>) -> Self {
        Catalog::new(suggestions)
    }
}

/// id → numeric value map built from a catalog snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueLookup {
    values: HashMap<String, f64>,
}

impl ValueLookup {
    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
