//! Tag insertion
//!
//! Selecting a suggestion replaces the trigger word before the caret with a
//! tag, follows it with a non-breaking space and ends the suggestion session.
//! The trigger word is re-read from the document at insertion time; when none
//! is there the document is left exactly as it was.

use thiserror::Error;
use tracing::debug;

use super::session::{OriginalNames, SuggestionSession};
use crate::catalog::Suggestion;
use crate::document::{Document, Segment, TagToken};
use crate::trigger;

/// Reasons an insertion request was ignored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    #[error("no suggestion session is active")]
    NoActiveSession,
    #[error("no trigger word before the caret")]
    TriggerMismatch,
    #[error("suggestion `{0}` is not in the catalog")]
    UnknownSuggestion(String),
}

/// Where an insertion put things
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub tag_segment: usize,
    pub spacer_segment: usize,
    /// The trigger word that was replaced
    pub replaced: String,
}

pub fn insert_tag(
    document: &mut Document,
    session: &mut SuggestionSession,
    original_names: &mut OriginalNames,
    suggestion: &Suggestion,
) -> Result<Insertion, InsertError> {
    if !session.is_active() {
        return Err(InsertError::NoActiveSession);
    }
    let replaced = trigger::detect(document)
        .map(str::to_string)
        .ok_or(InsertError::TriggerMismatch)?;

    let token = TagToken::from_suggestion(suggestion);
    let tag_segment = document
        .replace_range_before_caret(replaced.chars().count(), Segment::tag(token))
        .map_err(|_| InsertError::TriggerMismatch)?;
    let first_insertion = original_names.record(&suggestion.id, &suggestion.name);
    let spacer_segment = document.insert_trailing_spacer();
    session.deactivate();

    debug!(
        id = %suggestion.id,
        name = %suggestion.name,
        %replaced,
        first_insertion,
        "tag inserted"
    );
    Ok(Insertion {
        tag_segment,
        spacer_segment,
        replaced,
    })
}
