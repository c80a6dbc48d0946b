//! Editor state
//!
//! An [`Editor`] owns one document and the session state built around it:
//! the suggestion session, the original names of inserted tags and the tag
//! action menu. Hosts feed it keystrokes, clicks and commands; every call
//! finishes its mutation before returning.
//!
//! Mounting subscribes to the host's [`ClickDispatcher`] so that clicks
//! outside the action menu close it. The subscription lives as long as the
//! editor and is released when the editor is dropped.

pub mod insert;
pub mod menu;
pub mod observer;
pub mod session;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::catalog::{Catalog, CatalogError, Suggestion};
use crate::document::{Caret, Document, DocumentError, Removed};
use crate::expression::{self, Evaluation, ExpressionError};

pub use insert::{insert_tag, InsertError, Insertion};
pub use menu::{actions_for, anchor_for, ActionMenu, MenuAction};
pub use observer::{Bounds, ClickDispatcher, ClickSubscription, Point, PointerClick, Propagation};
pub use session::{OriginalNames, SuggestionSession};

/// Host-tunable editor behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    /// Rename labels offered by the action menu
    pub presets: Vec<String>,
    /// Gap between a clicked tag and its action menu
    pub anchor_offset: i32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        EditorSettings {
            presets: menu::DEFAULT_PRESETS.iter().map(|p| p.to_string()).collect(),
            anchor_offset: menu::DEFAULT_ANCHOR_OFFSET,
        }
    }
}

pub struct Editor {
    document: Document,
    catalog: Catalog,
    session: SuggestionSession,
    original_names: OriginalNames,
    menu: Rc<RefCell<ActionMenu>>,
    menu_bounds: Rc<Cell<Option<Bounds>>>,
    settings: EditorSettings,
    focused: bool,
    _outside_clicks: ClickSubscription,
}

impl Editor {
    /// Create an empty editor and register its outside-click listener
    pub fn mount(clicks: &ClickDispatcher, settings: EditorSettings) -> Self {
        let menu = Rc::new(RefCell::new(ActionMenu::default()));
        let menu_bounds: Rc<Cell<Option<Bounds>>> = Rc::new(Cell::new(None));

        let listener_menu = Rc::clone(&menu);
        let listener_bounds = Rc::clone(&menu_bounds);
        let subscription = clicks.subscribe(move |click| {
            if listener_bounds
                .get()
                .is_some_and(|bounds| bounds.contains(click.position))
            {
                return;
            }
            if listener_menu.borrow_mut().close() {
                listener_bounds.set(None);
                debug!(x = click.position.x, y = click.position.y, "action menu closed by outside click");
            }
        });

        Editor {
            document: Document::new(),
            catalog: Catalog::empty(),
            session: SuggestionSession::default(),
            original_names: OriginalNames::default(),
            menu,
            menu_bounds,
            settings,
            focused: true,
            _outside_clicks: subscription,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &SuggestionSession {
        &self.session
    }

    pub fn original_names(&self) -> &OriginalNames {
        &self.original_names
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    // Catalog

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    /// Install the outcome of a catalog fetch. A failed fetch keeps the
    /// current catalog.
    pub fn load_catalog(&mut self, result: Result<Catalog, CatalogError>) {
        match result {
            Ok(catalog) => self.set_catalog(catalog),
            Err(err) => warn!(error = %err, "catalog unavailable, suggestions disabled"),
        }
    }

    // Keystrokes

    pub fn type_text(&mut self, text: &str) {
        self.document.insert_text(text);
        self.refresh_trigger();
    }

    pub fn backspace(&mut self) -> Option<Removed> {
        let removed = self.document.delete_backward();
        self.refresh_trigger();
        removed
    }

    pub fn delete(&mut self) -> Option<Removed> {
        let removed = self.document.delete_forward();
        self.refresh_trigger();
        removed
    }

    pub fn move_left(&mut self) -> bool {
        let moved = self.document.move_left();
        self.refresh_trigger();
        moved
    }

    pub fn move_right(&mut self) -> bool {
        let moved = self.document.move_right();
        self.refresh_trigger();
        moved
    }

    pub fn move_to_start(&mut self) {
        self.document.move_to_start();
        self.refresh_trigger();
    }

    pub fn move_to_end(&mut self) {
        self.document.move_to_end();
        self.refresh_trigger();
    }

    /// Move the caret to a position reported by the host
    pub fn set_caret(&mut self, caret: Caret) -> Result<(), DocumentError> {
        self.document.set_caret(caret)?;
        self.refresh_trigger();
        Ok(())
    }

    fn refresh_trigger(&mut self) {
        self.session.refresh(&self.document);
    }

    // Suggestions

    /// Catalog entries for the current trigger word, empty without a session
    pub fn suggestions(&self) -> Vec<&Suggestion> {
        if !self.session.is_active() {
            return Vec::new();
        }
        self.catalog.filter(self.session.search_term())
    }

    pub fn suggestion_overlay_visible(&self) -> bool {
        !self.suggestions().is_empty()
    }

    /// Insert the catalog entry with `id` in place of the trigger word
    pub fn select_suggestion(&mut self, id: &str) -> Result<Insertion, InsertError> {
        let suggestion = self
            .catalog
            .get(id)
            .ok_or_else(|| InsertError::UnknownSuggestion(id.to_string()))?;
        let result = insert_tag(
            &mut self.document,
            &mut self.session,
            &mut self.original_names,
            suggestion,
        );
        self.finish_insertion(result)
    }

    pub fn insert_suggestion(&mut self, suggestion: &Suggestion) -> Result<Insertion, InsertError> {
        let result = insert_tag(
            &mut self.document,
            &mut self.session,
            &mut self.original_names,
            suggestion,
        );
        self.finish_insertion(result)
    }

    fn finish_insertion(&mut self, result: Result<Insertion, InsertError>) -> Result<Insertion, InsertError> {
        match &result {
            Ok(_) => self.focused = true,
            Err(err) => debug!(error = %err, "insertion ignored"),
        }
        result
    }

    // Action menu

    /// Handle a click on the tag at `segment`. `tag` is the tag's on-screen
    /// bounds and `origin` the editor's top-left corner.
    pub fn click_tag(&mut self, segment: usize, tag: Bounds, origin: Point) -> Propagation {
        let Some(token) = self.document.tag_at(segment) else {
            return Propagation::Continue;
        };
        let anchor = anchor_for(tag, origin, self.settings.anchor_offset);
        debug!(id = token.id(), x = anchor.x, y = anchor.y, "action menu opened");
        self.menu.borrow_mut().open(token.id(), anchor);
        self.menu_bounds.set(None);
        Propagation::Stop
    }

    /// Current menu state
    pub fn action_menu(&self) -> ActionMenu {
        self.menu.borrow().clone()
    }

    /// Screen area of the open menu; clicks inside it do not close it
    pub fn set_action_menu_bounds(&mut self, bounds: Option<Bounds>) {
        self.menu_bounds.set(bounds);
    }

    /// Entries of the open menu, empty when closed
    pub fn menu_actions(&self) -> Vec<MenuAction> {
        match self.menu.borrow().tag_id() {
            Some(id) => actions_for(&self.settings.presets, self.original_names.get(id)),
            None => Vec::new(),
        }
    }

    /// Rename every tag sharing the open menu's id, then close the menu.
    /// Returns how many tags were renamed.
    pub fn select_action(&mut self, action: &MenuAction) -> usize {
        let Some(id) = self.menu.borrow().tag_id().map(str::to_string) else {
            return 0;
        };
        let renamed = self.document.rename_tags(&id, action.label());
        debug!(%id, name = action.label(), renamed, "tags renamed");
        self.close_action_menu();
        renamed
    }

    pub fn select_action_at(&mut self, index: usize) -> Option<usize> {
        let action = self.menu_actions().into_iter().nth(index)?;
        Some(self.select_action(&action))
    }

    pub fn close_action_menu(&mut self) -> bool {
        self.menu_bounds.set(None);
        self.menu.borrow_mut().close()
    }

    // Evaluation

    /// Evaluate the document against the current catalog
    pub fn evaluate(&self) -> Result<Evaluation, ExpressionError> {
        let result = expression::evaluate_document(&self.document, &self.catalog);
        if let Err(err) = &result {
            debug!(error = %err, "evaluation failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Segment, TagToken};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Suggestion::new("1", "north", "Revenue", 5),
            Suggestion::new("2", "south", "Cost", "3"),
        ])
    }

    fn editor(clicks: &ClickDispatcher) -> Editor {
        let mut editor = Editor::mount(clicks, EditorSettings::default());
        editor.set_catalog(catalog());
        editor
    }

    #[test]
    fn test_typing_drives_suggestions() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);

        editor.type_text("1+rev");
        assert_eq!(editor.session().search_term(), "rev");
        let ids: Vec<&str> = editor.suggestions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert!(editor.suggestion_overlay_visible());

        editor.type_text(" ");
        assert!(editor.suggestions().is_empty());
    }

    #[test]
    fn test_select_suggestion() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);
        editor.type_text("co");
        editor.set_focused(false);

        editor.select_suggestion("2").unwrap();
        assert_eq!(
            editor.document().segments(),
            &[Segment::tag(TagToken::new("2", "Cost", "south")), Segment::spacer()]
        );
        assert!(editor.is_focused());
        assert!(!editor.session().is_active());
    }

    #[test]
    fn test_unknown_suggestion() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);
        editor.type_text("x");
        assert_eq!(
            editor.select_suggestion("9"),
            Err(InsertError::UnknownSuggestion("9".into()))
        );
        assert_eq!(editor.document().segments(), &[Segment::text("x")]);
    }

    #[test]
    fn test_click_tag_opens_menu() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);
        editor.type_text("rev");
        editor.select_suggestion("1").unwrap();

        let propagation = editor.click_tag(0, Bounds::new(10, 3, 20, 4), Point::new(2, 1));
        assert_eq!(propagation, Propagation::Stop);
        assert_eq!(editor.action_menu().tag_id(), Some("1"));
        assert_eq!(editor.action_menu().anchor(), Some(Point::new(23, 2)));

        // Clicking text is not a tag click
        assert_eq!(
            editor.click_tag(1, Bounds::default(), Point::default()),
            Propagation::Continue
        );
    }

    #[test]
    fn test_outside_click_closes_menu() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);
        editor.type_text("rev");
        editor.select_suggestion("1").unwrap();
        editor.click_tag(0, Bounds::new(0, 0, 10, 1), Point::default());
        editor.set_action_menu_bounds(Some(Bounds::new(15, 0, 30, 4)));

        clicks.dispatch(&PointerClick::at(20, 2));
        assert!(editor.action_menu().is_open());

        clicks.dispatch(&PointerClick::at(50, 9));
        assert!(!editor.action_menu().is_open());
    }

    #[test]
    fn test_menu_actions_include_original() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);
        assert!(editor.menu_actions().is_empty());

        editor.type_text("rev");
        editor.select_suggestion("1").unwrap();
        editor.click_tag(0, Bounds::default(), Point::default());

        let labels: Vec<String> = editor
            .menu_actions()
            .iter()
            .map(|a| a.label().to_string())
            .collect();
        assert_eq!(labels, vec!["Action 1", "Action 2", "north"]);
    }

    #[test]
    fn test_select_action_without_menu() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);
        assert_eq!(editor.select_action(&MenuAction::Preset("Action 1".into())), 0);
        assert_eq!(editor.select_action_at(0), None);
    }

    #[test]
    fn test_evaluate() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);
        editor.type_text("2*");
        editor.type_text("co");
        editor.select_suggestion("2").unwrap();

        let evaluation = editor.evaluate().unwrap();
        assert_eq!(evaluation.expression, "2*3\u{a0}");
        assert_eq!(evaluation.value, 6.0);
    }

    #[test]
    fn test_failed_catalog_keeps_current() {
        let clicks = ClickDispatcher::new();
        let mut editor = editor(&clicks);
        editor.load_catalog(Err(CatalogError::Abandoned));
        assert_eq!(editor.catalog().len(), 2);
    }

    #[test]
    fn test_drop_releases_listener() {
        let clicks = ClickDispatcher::new();
        let editor = editor(&clicks);
        assert_eq!(clicks.listener_count(), 1);
        drop(editor);
        assert_eq!(clicks.listener_count(), 0);
    }
}
