//! Mixed-content document model
//!
//! A [`Document`] owns an ordered list of [`Segment`]s and a [`Caret`]. Plain
//! text is edited character by character; tags are atomic and are inserted or
//! removed as a whole, never split.
//!
//! The document knows nothing about rendering. A host reports caret moves with
//! [`Document::set_caret`] (or the relative movement helpers) and reflects the
//! segments back to the user however it likes.
//!
//! Tag insertion is built from two primitives that are applied back to back
//! under a single `&mut` borrow:
//!
//! - [`Document::replace_range_before_caret`] swaps the characters just typed
//!   for a segment. It validates before touching anything.
//! - [`Document::insert_trailing_spacer`] adds the non-breaking space after it.
//!   It cannot fail.
//!
//! Adjacent text segments are not merged; the spacer after a tag stays its own
//! segment and typing continues inside it.

pub mod caret;
pub mod segment;

use thiserror::Error;

pub use caret::Caret;
pub use segment::{Segment, TagToken, NBSP};

/// Rejected document operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("segment {segment} does not exist (document has {len} segments)")]
    SegmentOutOfBounds { segment: usize, len: usize },
    #[error("offset {offset} is past the end of text segment {segment} ({len} characters)")]
    OffsetOutOfBounds {
        segment: usize,
        offset: usize,
        len: usize,
    },
    #[error("segment {segment} is not a {expected} segment")]
    WrongSegmentKind {
        segment: usize,
        expected: &'static str,
    },
    #[error("cannot remove {requested} characters before the caret, only {available} available")]
    RangeOutOfBounds { requested: usize, available: usize },
}

/// What a character-level deletion took out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removed {
    Char(char),
    Tag(TagToken),
}

/// Ordered segments plus caret
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    segments: Vec<Segment>,
    caret: Caret,
}

impl Document {
    /// Empty document, caret at the start
    pub fn new() -> Self {
        Document::default()
    }

    /// Document holding `segments`, caret at the end
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut document = Document {
            segments,
            caret: Caret::Start,
        };
        document.move_to_end();
        document
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &TagToken> {
        self.segments.iter().filter_map(Segment::as_tag)
    }

    pub fn tag_at(&self, segment: usize) -> Option<&TagToken> {
        self.segments.get(segment).and_then(Segment::as_tag)
    }

    /// Index of the closest tag at or before the caret
    pub fn tag_before_caret(&self) -> Option<usize> {
        let end = match self.caret {
            Caret::Start => return None,
            Caret::Text { segment, .. } => segment,
            Caret::AfterTag { segment } => segment + 1,
        };
        (0..end.min(self.segments.len()))
            .rev()
            .find(|&index| self.segments[index].is_tag())
    }

    /// Total caret units: characters plus one per tag
    pub fn unit_len(&self) -> usize {
        self.segments.iter().map(Segment::unit_len).sum()
    }

    /// Move the caret to a position reported by the host
    pub fn set_caret(&mut self, caret: Caret) -> Result<(), DocumentError> {
        self.validate(caret)?;
        self.caret = caret;
        Ok(())
    }

    fn validate(&self, caret: Caret) -> Result<(), DocumentError> {
        let len = self.segments.len();
        match caret {
            Caret::Start => Ok(()),
            Caret::Text { segment, offset } => match self.segments.get(segment) {
                None => Err(DocumentError::SegmentOutOfBounds { segment, len }),
                Some(Segment::Tag(_)) => Err(DocumentError::WrongSegmentKind {
                    segment,
                    expected: "text",
                }),
                Some(Segment::Text { content }) => {
                    let chars = content.chars().count();
                    if offset > chars {
                        Err(DocumentError::OffsetOutOfBounds {
                            segment,
                            offset,
                            len: chars,
                        })
                    } else {
                        Ok(())
                    }
                }
            },
            Caret::AfterTag { segment } => match self.segments.get(segment) {
                None => Err(DocumentError::SegmentOutOfBounds { segment, len }),
                Some(Segment::Text { .. }) => Err(DocumentError::WrongSegmentKind {
                    segment,
                    expected: "tag",
                }),
                Some(Segment::Tag(_)) => Ok(()),
            },
        }
    }

    /// Text of the caret's segment from its start up to the caret.
    ///
    /// Tags contribute nothing, so the view is empty right after a tag.
    pub fn text_before_caret(&self) -> &str {
        match self.caret {
            Caret::Text { segment, offset } => match self.segments.get(segment) {
                Some(Segment::Text { content }) => &content[..byte_offset(content, offset)],
                _ => "",
            },
            Caret::Start | Caret::AfterTag { .. } => "",
        }
    }

    /// Type `text` at the caret and advance past it
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let added = text.chars().count();
        match self.caret {
            Caret::Text { segment, offset } => {
                if let Some(Segment::Text { content }) = self.segments.get_mut(segment) {
                    let at = byte_offset(content, offset);
                    content.insert_str(at, text);
                    self.caret = Caret::text(segment, offset + added);
                }
            }
            Caret::AfterTag { segment } => self.prepend_text(segment + 1, text),
            Caret::Start => self.prepend_text(0, text),
        }
    }

    fn prepend_text(&mut self, index: usize, text: &str) {
        match self.segments.get_mut(index) {
            Some(Segment::Text { content }) => content.insert_str(0, text),
            _ => self.segments.insert(index, Segment::text(text)),
        }
        self.caret = Caret::text(index, text.chars().count());
    }

    /// Insert `segment` at the caret, splitting the caret's text segment if
    /// needed, and place the caret right after it. Returns its index.
    pub fn insert_segment_at_caret(&mut self, segment: Segment) -> usize {
        let index = match self.caret {
            Caret::Start => 0,
            Caret::AfterTag { segment } => segment + 1,
            Caret::Text { segment, offset } => self.split_text(segment, offset),
        };

        self.caret = match &segment {
            Segment::Tag(_) => Caret::after_tag(index),
            Segment::Text { content } => Caret::text(index, content.chars().count()),
        };
        self.segments.insert(index, segment);
        index
    }

    /// Split text segment `segment` at `offset`, dropping an empty left half.
    /// Returns the index where something placed between the halves belongs.
    fn split_text(&mut self, segment: usize, offset: usize) -> usize {
        let (right, left_empty) = match self.segments.get_mut(segment) {
            Some(Segment::Text { content }) => {
                let right = content.split_off(byte_offset(content, offset));
                (right, content.is_empty())
            }
            _ => return segment + 1,
        };

        if !right.is_empty() {
            self.segments.insert(segment + 1, Segment::text(right));
        }
        if left_empty {
            self.segments.remove(segment);
            segment
        } else {
            segment + 1
        }
    }

    /// Remove the `length` characters just before the caret and put `segment`
    /// in their place. Nothing changes when the range is not available.
    pub fn replace_range_before_caret(
        &mut self,
        length: usize,
        segment: Segment,
    ) -> Result<usize, DocumentError> {
        if length == 0 {
            return Ok(self.insert_segment_at_caret(segment));
        }

        let (index, offset) = match self.caret {
            Caret::Text { segment, offset } => (segment, offset),
            Caret::Start | Caret::AfterTag { .. } => {
                return Err(DocumentError::RangeOutOfBounds {
                    requested: length,
                    available: 0,
                })
            }
        };
        if length > offset {
            return Err(DocumentError::RangeOutOfBounds {
                requested: length,
                available: offset,
            });
        }

        if let Some(Segment::Text { content }) = self.segments.get_mut(index) {
            let start = byte_offset(content, offset - length);
            let end = byte_offset(content, offset);
            content.replace_range(start..end, "");
        }
        self.caret = Caret::text(index, offset - length);
        Ok(self.insert_segment_at_caret(segment))
    }

    /// Insert a single non-breaking space right after the caret and step past it
    pub fn insert_trailing_spacer(&mut self) -> usize {
        self.insert_segment_at_caret(Segment::spacer())
    }

    /// Backspace: remove the character or whole tag before the caret
    pub fn delete_backward(&mut self) -> Option<Removed> {
        let units = self.caret_units();
        if units == 0 {
            return None;
        }
        let removed = self.remove_unit(units - 1);
        self.caret = self.caret_at_units(units - 1);
        removed
    }

    /// Delete: remove the character or whole tag after the caret
    pub fn delete_forward(&mut self) -> Option<Removed> {
        let units = self.caret_units();
        if units >= self.unit_len() {
            return None;
        }
        let removed = self.remove_unit(units);
        self.caret = self.caret_at_units(units);
        removed
    }

    fn remove_unit(&mut self, unit: usize) -> Option<Removed> {
        let mut remaining = unit;
        for index in 0..self.segments.len() {
            let len = self.segments[index].unit_len();
            if remaining >= len {
                remaining -= len;
                continue;
            }

            if self.segments[index].is_tag() {
                return match self.segments.remove(index) {
                    Segment::Tag(tag) => Some(Removed::Tag(tag)),
                    Segment::Text { .. } => None,
                };
            }

            let (removed, emptied) = match &mut self.segments[index] {
                Segment::Text { content } => {
                    let ch = content.remove(byte_offset(content, remaining));
                    (ch, content.is_empty())
                }
                Segment::Tag(_) => return None,
            };
            if emptied {
                self.segments.remove(index);
            }
            return Some(Removed::Char(removed));
        }
        None
    }

    pub fn move_left(&mut self) -> bool {
        let units = self.caret_units();
        if units == 0 {
            return false;
        }
        self.caret = self.caret_at_units(units - 1);
        true
    }

    pub fn move_right(&mut self) -> bool {
        let units = self.caret_units();
        if units >= self.unit_len() {
            return false;
        }
        self.caret = self.caret_at_units(units + 1);
        true
    }

    pub fn move_to_start(&mut self) {
        self.caret = self.caret_at_units(0);
    }

    pub fn move_to_end(&mut self) {
        self.caret = self.caret_at_units(self.unit_len());
    }

    /// Caret as a flat unit index
    pub fn caret_units(&self) -> usize {
        let before = |segment: usize| -> usize {
            self.segments[..segment.min(self.segments.len())]
                .iter()
                .map(Segment::unit_len)
                .sum()
        };
        match self.caret {
            Caret::Start => 0,
            Caret::Text { segment, offset } => before(segment) + offset,
            Caret::AfterTag { segment } => before(segment) + 1,
        }
    }

    /// Caret for a flat unit index, clamped to the document.
    ///
    /// A position on a segment boundary resolves to the end of the earlier
    /// segment, so typing after a spacer keeps extending the spacer's text.
    pub fn caret_at_units(&self, units: usize) -> Caret {
        let units = units.min(self.unit_len());
        if units == 0 {
            return match self.segments.first() {
                Some(Segment::Text { .. }) => Caret::text(0, 0),
                _ => Caret::Start,
            };
        }

        let mut remaining = units;
        for (index, segment) in self.segments.iter().enumerate() {
            let len = segment.unit_len();
            if remaining <= len {
                return match segment {
                    Segment::Text { .. } => Caret::text(index, remaining),
                    Segment::Tag(_) => Caret::after_tag(index),
                };
            }
            remaining -= len;
        }
        Caret::Start
    }

    /// Set the display name of every tag with `id`. Returns how many changed.
    pub(crate) fn rename_tags(&mut self, id: &str, name: &str) -> usize {
        let mut renamed = 0;
        for segment in &mut self.segments {
            if let Segment::Tag(tag) = segment {
                if tag.id() == id {
                    tag.set_display_name(name);
                    renamed += 1;
                }
            }
        }
        renamed
    }
}

/// Byte index of the `chars`-th character, or the end of `text`
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: &str) -> Segment {
        Segment::tag(TagToken::new(id, "Revenue", format!("name-{}", id)))
    }

    fn typed(text: &str) -> Document {
        let mut doc = Document::new();
        doc.insert_text(text);
        doc
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.caret(), Caret::Start);
        assert_eq!(doc.text_before_caret(), "");
    }

    #[test]
    fn test_typing_creates_text_segment() {
        let doc = typed("1+abc");
        assert_eq!(doc.segments(), &[Segment::text("1+abc")]);
        assert_eq!(doc.caret(), Caret::text(0, 5));
        assert_eq!(doc.text_before_caret(), "1+abc");
    }

    #[test]
    fn test_text_before_caret_stops_at_caret() {
        let mut doc = typed("hello world");
        doc.set_caret(Caret::text(0, 5)).unwrap();
        assert_eq!(doc.text_before_caret(), "hello");
    }

    #[test]
    fn test_text_before_caret_handles_multibyte() {
        let mut doc = typed("héllo");
        doc.set_caret(Caret::text(0, 2)).unwrap();
        assert_eq!(doc.text_before_caret(), "hé");
    }

    #[test]
    fn test_replace_range_before_caret() {
        let mut doc = typed("1+cat");
        let index = doc.replace_range_before_caret(3, tag("5")).unwrap();

        assert_eq!(index, 1);
        assert_eq!(doc.segments(), &[Segment::text("1+"), tag("5")]);
        assert_eq!(doc.caret(), Caret::after_tag(1));
        assert_eq!(doc.text_before_caret(), "");
    }

    #[test]
    fn test_replace_range_keeps_text_after_caret() {
        let mut doc = typed("1+cat*3");
        doc.set_caret(Caret::text(0, 5)).unwrap();
        doc.replace_range_before_caret(3, tag("5")).unwrap();

        assert_eq!(
            doc.segments(),
            &[Segment::text("1+"), tag("5"), Segment::text("*3")]
        );
    }

    #[test]
    fn test_replace_whole_segment_drops_empty_text() {
        let mut doc = typed("cat");
        doc.replace_range_before_caret(3, tag("5")).unwrap();
        assert_eq!(doc.segments(), &[tag("5")]);
        assert_eq!(doc.caret(), Caret::after_tag(0));
    }

    #[test]
    fn test_replace_range_out_of_bounds_changes_nothing() {
        let mut doc = typed("ab");
        let before = doc.clone();

        let err = doc.replace_range_before_caret(3, tag("5")).unwrap_err();
        assert_eq!(
            err,
            DocumentError::RangeOutOfBounds {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_trailing_spacer_after_tag() {
        let mut doc = typed("cat");
        doc.replace_range_before_caret(3, tag("5")).unwrap();
        let index = doc.insert_trailing_spacer();

        assert_eq!(index, 1);
        assert_eq!(doc.segments(), &[tag("5"), Segment::spacer()]);
        assert_eq!(doc.caret(), Caret::text(1, 1));
        assert_eq!(doc.text_before_caret(), "\u{00A0}");
    }

    #[test]
    fn test_typing_after_spacer_extends_it() {
        let mut doc = typed("cat");
        doc.replace_range_before_caret(3, tag("5")).unwrap();
        doc.insert_trailing_spacer();
        doc.insert_text("+2");

        assert_eq!(doc.segments(), &[tag("5"), Segment::text("\u{00A0}+2")]);
        assert_eq!(doc.text_before_caret(), "\u{00A0}+2");
    }

    #[test]
    fn test_typing_right_after_tag() {
        let mut doc = Document::from_segments(vec![tag("1")]);
        doc.insert_text("*2");
        assert_eq!(doc.segments(), &[tag("1"), Segment::text("*2")]);
        assert_eq!(doc.caret(), Caret::text(1, 2));
    }

    #[test]
    fn test_typing_before_leading_tag() {
        let mut doc = Document::from_segments(vec![tag("1")]);
        doc.move_to_start();
        assert_eq!(doc.caret(), Caret::Start);
        doc.insert_text("2*");
        assert_eq!(doc.segments(), &[Segment::text("2*"), tag("1")]);
    }

    #[test]
    fn test_backspace_removes_tag_whole() {
        let mut doc = Document::from_segments(vec![Segment::text("1+"), tag("5")]);
        let removed = doc.delete_backward();

        assert!(matches!(removed, Some(Removed::Tag(t)) if t.id() == "5"));
        assert_eq!(doc.segments(), &[Segment::text("1+")]);
        assert_eq!(doc.caret(), Caret::text(0, 2));
    }

    #[test]
    fn test_backspace_removes_characters() {
        let mut doc = typed("ab");
        assert_eq!(doc.delete_backward(), Some(Removed::Char('b')));
        assert_eq!(doc.delete_backward(), Some(Removed::Char('a')));
        assert!(doc.is_empty());
        assert_eq!(doc.caret(), Caret::Start);
        assert_eq!(doc.delete_backward(), None);
    }

    #[test]
    fn test_backspace_empties_spacer_then_hits_tag() {
        let mut doc = Document::from_segments(vec![tag("5"), Segment::spacer()]);
        assert_eq!(doc.delete_backward(), Some(Removed::Char(NBSP)));
        assert_eq!(doc.segments(), &[tag("5")]);
        assert_eq!(doc.caret(), Caret::after_tag(0));
        assert!(matches!(doc.delete_backward(), Some(Removed::Tag(_))));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_delete_forward_removes_tag_whole() {
        let mut doc = Document::from_segments(vec![Segment::text("1+"), tag("5"), Segment::text("*3")]);
        doc.set_caret(Caret::text(0, 2)).unwrap();

        assert!(matches!(doc.delete_forward(), Some(Removed::Tag(_))));
        assert_eq!(doc.segments(), &[Segment::text("1+"), Segment::text("*3")]);
        assert_eq!(doc.delete_forward(), Some(Removed::Char('*')));
        assert_eq!(doc.segments(), &[Segment::text("1+"), Segment::text("3")]);
    }

    #[test]
    fn test_delete_forward_at_end() {
        let mut doc = typed("1");
        assert_eq!(doc.delete_forward(), None);
    }

    #[test]
    fn test_movement_steps_over_tags() {
        let mut doc = Document::from_segments(vec![Segment::text("ab"), tag("5"), Segment::text("c")]);
        assert_eq!(doc.caret(), Caret::text(2, 1));

        assert!(doc.move_left());
        assert_eq!(doc.caret(), Caret::after_tag(1));
        assert!(doc.move_left());
        assert_eq!(doc.caret(), Caret::text(0, 2));
        assert!(doc.move_right());
        assert_eq!(doc.caret(), Caret::after_tag(1));

        doc.move_to_start();
        assert_eq!(doc.caret(), Caret::text(0, 0));
        assert!(!doc.move_left());

        doc.move_to_end();
        assert!(!doc.move_right());
    }

    #[test]
    fn test_set_caret_validation() {
        let mut doc = Document::from_segments(vec![Segment::text("ab"), tag("5")]);

        assert_eq!(
            doc.set_caret(Caret::text(2, 0)),
            Err(DocumentError::SegmentOutOfBounds { segment: 2, len: 2 })
        );
        assert_eq!(
            doc.set_caret(Caret::text(1, 0)),
            Err(DocumentError::WrongSegmentKind {
                segment: 1,
                expected: "text"
            })
        );
        assert_eq!(
            doc.set_caret(Caret::text(0, 3)),
            Err(DocumentError::OffsetOutOfBounds {
                segment: 0,
                offset: 3,
                len: 2
            })
        );
        assert_eq!(
            doc.set_caret(Caret::after_tag(0)),
            Err(DocumentError::WrongSegmentKind {
                segment: 0,
                expected: "tag"
            })
        );
        assert!(doc.set_caret(Caret::after_tag(1)).is_ok());
    }

    #[test]
    fn test_tag_before_caret() {
        let mut doc = Document::from_segments(vec![tag("1"), Segment::text("+"), tag("2"), Segment::text("*3")]);
        assert_eq!(doc.tag_before_caret(), Some(2));

        doc.set_caret(Caret::text(1, 1)).unwrap();
        assert_eq!(doc.tag_before_caret(), Some(0));

        doc.set_caret(Caret::Start).unwrap();
        assert_eq!(doc.tag_before_caret(), None);
    }

    #[test]
    fn test_rename_tags_by_id() {
        let mut doc = Document::from_segments(vec![tag("1"), Segment::text("+"), tag("1"), tag("2")]);
        assert_eq!(doc.rename_tags("1", "Action 1"), 2);

        let names: Vec<&str> = doc.tags().map(TagToken::display_name).collect();
        assert_eq!(names, vec!["Action 1", "Action 1", "name-2"]);
    }
}
