//! Document segments
//!
//! A document is an ordered run of segments: plain text typed by the user, and
//! tag tokens inserted from the catalog. A tag is atomic; it contributes no
//! characters to text views of the document and is only ever removed whole.

use serde::{Deserialize, Serialize};

use crate::catalog::Suggestion;

/// Spacer placed after every inserted tag
pub const NBSP: char = '\u{00A0}';

/// One unit of document content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text { content: String },
    Tag(TagToken),
}

impl Segment {
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text {
            content: content.into(),
        }
    }

    pub fn tag(token: TagToken) -> Self {
        Segment::Tag(token)
    }

    /// The single non-breaking space that trails an inserted tag
    pub fn spacer() -> Self {
        Segment::text(NBSP.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text { content } => Some(content),
            Segment::Tag(_) => None,
        }
    }

    pub fn as_tag(&self) -> Option<&TagToken> {
        match self {
            Segment::Tag(token) => Some(token),
            Segment::Text { .. } => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Segment::Tag(_))
    }

    /// Caret units the segment occupies: one per character, one per tag
    pub fn unit_len(&self) -> usize {
        match self {
            Segment::Text { content } => content.chars().count(),
            Segment::Tag(_) => 1,
        }
    }
}

/// An inserted catalog entry.
///
/// `id` is not unique within a document; the same suggestion may be inserted
/// any number of times. `original_name` is fixed at insertion, while
/// `display_name` changes through the action menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagToken {
    id: String,
    category: String,
    display_name: String,
    original_name: String,
}

impl TagToken {
    pub fn new(id: impl Into<String>, category: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        TagToken {
            id: id.into(),
            category: category.into(),
            display_name: name.clone(),
            original_name: name,
        }
    }

    pub fn from_suggestion(suggestion: &Suggestion) -> Self {
        TagToken::new(&suggestion.id, &suggestion.category, &suggestion.name)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub(crate) fn set_display_name(&mut self, name: &str) {
        self.display_name = name.to_string();
    }
}
