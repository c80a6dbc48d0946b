//! # formula
//!
//! Core of a tag-aware formula editor. Users type arithmetic mixed with tags
//! picked from a suggestion catalog, then evaluate the result with each tag
//! replaced by its catalog value.
//!
//! - [`document`]: segments (text and tags) plus a caret
//! - [`trigger`]: the word before the caret that opens a suggestion session
//! - [`catalog`]: suggestions, the category filter and catalog sources
//! - [`editor`]: tag insertion, the tag action menu and click observation
//! - [`expression`]: serialization, parsing and evaluation of formulas
//! - [`config`]: layered configuration for the `formula` binary

pub mod catalog;
pub mod config;
pub mod document;
pub mod editor;
pub mod expression;
pub mod trigger;
