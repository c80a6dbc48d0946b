//! Caret positions
//!
//! Inside a text segment the caret is a (segment, char offset) pair. Directly
//! after a tag there is no text to index into, so the caret just names the tag.
//! Before any content it sits at [`Caret::Start`].
//!
//! For movement and deletion the document is also viewed as a flat run of
//! units (one per character, one per tag); [`Document::caret_units`] and
//! [`Document::caret_at_units`] convert between the two views.
//!
//! [`Document::caret_units`]: super::Document::caret_units
//! [`Document::caret_at_units`]: super::Document::caret_at_units

/// Where the caret sits in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Caret {
    /// Before all content
    #[default]
    Start,
    /// Inside text segment `segment`, after `offset` characters
    Text { segment: usize, offset: usize },
    /// Immediately after the tag at `segment`
    AfterTag { segment: usize },
}

impl Caret {
    pub fn text(segment: usize, offset: usize) -> Self {
        Caret::Text { segment, offset }
    }

    pub fn after_tag(segment: usize) -> Self {
        Caret::AfterTag { segment }
    }
}
