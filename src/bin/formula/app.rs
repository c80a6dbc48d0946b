//! Main application state and event handling
//!
//! The App struct brings together:
//! - the editor (document, suggestion session, action menu)
//! - the click dispatcher the editor listens on for outside clicks
//! - the pending catalog fetch
//! - overlay highlights and the status line

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use formula::catalog::source::PendingCatalog;
use formula::catalog::Catalog;
use formula::editor::{ClickDispatcher, Editor, EditorSettings, PointerClick, Propagation};
use formula::expression::{Evaluation, ExpressionError};
use ratatui::layout::Rect;

use crate::ui::{self, Areas, PlacedKind};

/// Where the catalog stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Loading,
    Ready(usize),
    Unavailable,
}

impl fmt::Display for CatalogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogState::Loading => write!(f, "loading suggestions..."),
            CatalogState::Ready(count) => write!(f, "{} suggestions", count),
            CatalogState::Unavailable => write!(f, "suggestions unavailable"),
        }
    }
}

/// Outcome of the last evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Result(f64),
    Error(String),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

impl From<Result<Evaluation, ExpressionError>> for Status {
    fn from(result: Result<Evaluation, ExpressionError>) -> Self {
        match result {
            Ok(evaluation) => Status::Result(evaluation.value),
            Err(err) => Status::Error(err.to_string()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Result(value) => write!(f, "Calculation result: {}", value),
            Status::Error(reason) => write!(f, "Error in the formula: {}", reason),
        }
    }
}

/// The main application
pub struct App {
    pub editor: Editor,

    /// Host-wide click observers; the editor's outside-click listener lives here
    pub clicks: ClickDispatcher,

    /// Fetch still in flight, if any
    pending: Option<PendingCatalog>,

    pub catalog_state: CatalogState,

    /// Highlighted row of the suggestion overlay
    pub highlighted: usize,

    /// Highlighted row of the action menu
    pub menu_highlighted: usize,

    pub status: Option<Status>,

    /// Terminal area of the last frame
    pub viewport: Rect,

    pub should_quit: bool,
}

impl App {
    pub fn new(settings: EditorSettings, pending: Option<PendingCatalog>) -> Self {
        let clicks = ClickDispatcher::new();
        let editor = Editor::mount(&clicks, settings);
        let catalog_state = if pending.is_some() {
            CatalogState::Loading
        } else {
            CatalogState::Ready(0)
        };
        App {
            editor,
            clicks,
            pending,
            catalog_state,
            highlighted: 0,
            menu_highlighted: 0,
            status: None,
            viewport: Rect::default(),
            should_quit: false,
        }
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog_state = CatalogState::Ready(catalog.len());
        self.editor.set_catalog(catalog);
    }

    /// Pick up the catalog once its fetch resolves.
    ///
    /// Returns whether the state changed (needed for re-rendering)
    pub fn tick(&mut self) -> bool {
        let Some(result) = self.pending.as_mut().and_then(PendingCatalog::poll) else {
            return false;
        };
        self.pending = None;
        match result {
            Ok(catalog) => self.set_catalog(catalog),
            Err(err) => {
                self.catalog_state = CatalogState::Unavailable;
                self.editor.load_catalog(Err(err));
            }
        }
        true
    }

    fn areas(&self) -> Areas {
        Areas::new(self.viewport)
    }

    /// Handle a keyboard event
    ///
    /// Returns whether the state changed (needed for re-rendering)
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return true;
            }
            KeyCode::Char('e') if ctrl => {
                self.evaluate();
                return true;
            }
            KeyCode::F(5) => {
                self.evaluate();
                return true;
            }
            KeyCode::Char('t') if ctrl => return self.open_menu_at_caret(),
            KeyCode::Esc => return self.close_menu(),
            _ => {}
        }

        if self.editor.action_menu().is_open() && self.handle_menu_key(key.code) {
            return true;
        }
        if self.editor.suggestion_overlay_visible() && self.handle_overlay_key(key.code) {
            return true;
        }
        self.handle_edit_key(key)
    }

    fn handle_menu_key(&mut self, code: KeyCode) -> bool {
        let count = self.editor.menu_actions().len();
        match code {
            KeyCode::Up => {
                self.menu_highlighted = self.menu_highlighted.saturating_sub(1);
                true
            }
            KeyCode::Down => {
                self.menu_highlighted = (self.menu_highlighted + 1).min(count.saturating_sub(1));
                true
            }
            KeyCode::Enter => {
                self.editor.select_action_at(self.menu_highlighted);
                self.menu_highlighted = 0;
                true
            }
            _ => false,
        }
    }

    fn handle_overlay_key(&mut self, code: KeyCode) -> bool {
        let suggestions = self.editor.suggestions();
        let count = suggestions.len();
        match code {
            KeyCode::Up => {
                self.highlighted = self.highlighted.saturating_sub(1);
                true
            }
            KeyCode::Down => {
                self.highlighted = (self.highlighted + 1).min(count.saturating_sub(1));
                true
            }
            KeyCode::Enter | KeyCode::Tab => {
                let Some(suggestion) = suggestions.get(self.highlighted.min(count - 1)) else {
                    return false;
                };
                let suggestion = (*suggestion).clone();
                let _ = self.editor.insert_suggestion(&suggestion);
                self.highlighted = 0;
                true
            }
            _ => false,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        let changed = match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.editor.type_text(ch.encode_utf8(&mut [0; 4]));
                true
            }
            KeyCode::Backspace => self.editor.backspace().is_some(),
            KeyCode::Delete => self.editor.delete().is_some(),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Home => {
                self.editor.move_to_start();
                true
            }
            KeyCode::End => {
                self.editor.move_to_end();
                true
            }
            _ => false,
        };
        if changed {
            self.highlighted = 0;
        }
        changed
    }

    fn evaluate(&mut self) {
        self.status = Some(Status::from(self.editor.evaluate()));
    }

    /// Open the action menu for the tag closest before the caret
    fn open_menu_at_caret(&mut self) -> bool {
        let Some(segment) = self.editor.document().tag_before_caret() else {
            return false;
        };
        let areas = self.areas();
        let layout = ui::layout_document(self.editor.document(), areas.editor_inner.width);
        let Some(chip) = layout.tag_chip(segment) else {
            return false;
        };
        let bounds = ui::placed_bounds(&areas, chip);
        self.editor.click_tag(segment, bounds, areas.editor_origin());
        self.sync_menu_bounds(&areas);
        true
    }

    fn close_menu(&mut self) -> bool {
        self.menu_highlighted = 0;
        self.editor.close_action_menu()
    }

    fn sync_menu_bounds(&mut self, areas: &Areas) {
        self.menu_highlighted = 0;
        let bounds = self.editor.action_menu().anchor().map(|anchor| {
            let actions = self.editor.menu_actions();
            let rect = ui::menu_area(areas, self.viewport, anchor, &actions);
            formula::editor::Bounds::new(
                rect.x.into(),
                rect.y.into(),
                i32::from(rect.right()),
                i32::from(rect.bottom()),
            )
        });
        self.editor.set_action_menu_bounds(bounds);
    }

    /// Handle a mouse event
    ///
    /// Returns whether the state changed (needed for re-rendering)
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        let (column, row) = (mouse.column, mouse.row);
        let areas = self.areas();

        if self.click_menu(&areas, column, row) == Propagation::Stop {
            return true;
        }
        if self.click_document(&areas, column, row) == Propagation::Stop {
            return true;
        }
        self.clicks
            .dispatch(&PointerClick::at(column.into(), row.into()));
        true
    }

    fn click_menu(&mut self, areas: &Areas, column: u16, row: u16) -> Propagation {
        let Some(anchor) = self.editor.action_menu().anchor() else {
            return Propagation::Continue;
        };
        let actions = self.editor.menu_actions();
        let rect = ui::menu_area(areas, self.viewport, anchor, &actions);
        if !rect.contains(ratatui::layout::Position::new(column, row)) {
            return Propagation::Continue;
        }
        // Border rows do nothing
        if let Some(index) = row.checked_sub(rect.y + 1).map(usize::from) {
            if index < actions.len() {
                self.editor.select_action(&actions[index]);
                self.menu_highlighted = 0;
            }
        }
        Propagation::Stop
    }

    fn click_document(&mut self, areas: &Areas, column: u16, row: u16) -> Propagation {
        let inner = areas.editor_inner;
        if !inner.contains(ratatui::layout::Position::new(column, row)) {
            return Propagation::Continue;
        }
        let (x, y) = (column - inner.x, row - inner.y);
        let layout = ui::layout_document(self.editor.document(), inner.width);

        let hit = layout.placed.iter().find(|p| p.contains(x, y)).cloned();
        match hit {
            Some(placed) if placed.name_contains(x, y) => {
                let bounds = ui::placed_bounds(areas, &placed);
                let propagation = self.editor.click_tag(placed.segment, bounds, areas.editor_origin());
                self.sync_menu_bounds(areas);
                propagation
            }
            Some(placed) => {
                let units = match placed.kind {
                    PlacedKind::Char(_) => placed.unit,
                    PlacedKind::Tag { .. } => placed.unit + 1,
                };
                let caret = self.editor.document().caret_at_units(units);
                let _ = self.editor.set_caret(caret);
                Propagation::Continue
            }
            None => {
                self.editor.move_to_end();
                Propagation::Continue
            }
        }
    }
}
