//! Suggestion filtering
//!
//! A suggestion matches when its category contains the search term as a
//! case-insensitive substring. Order is catalog order, and an empty term keeps
//! every suggestion. There is no ranking.

use super::Suggestion;

pub fn filter_by_category<'a>(suggestions: &'a [Suggestion], term: &str) -> Vec<&'a Suggestion> {
    let needle = term.to_lowercase();
    suggestions
        .iter()
        .filter(|s| s.category.to_lowercase().contains(&needle))
        .collect()
}
