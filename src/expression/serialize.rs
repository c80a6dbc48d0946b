//! Document to formula text
//!
//! Text segments are copied verbatim. Each tag becomes the numeric value of
//! its id in the catalog, or `0` when the id is no longer known.

use tracing::debug;

use crate::catalog::ValueLookup;
use crate::document::{Document, Segment};

pub fn serialize(document: &Document, values: &ValueLookup) -> String {
    let mut formula = String::new();
    for segment in document.segments() {
        match segment {
            Segment::Text { content } => formula.push_str(content),
            Segment::Tag(tag) => match values.get(tag.id()) {
                Some(value) => formula.push_str(&value.to_string()),
                None => {
                    debug!(tag_id = tag.id(), "tag has no catalog value, using 0");
                    formula.push('0');
                }
            },
        }
    }
    formula
}
