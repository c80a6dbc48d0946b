//! UI rendering logic
//!
//! Layout structure:
//! - Title bar (1 line, fixed)
//! - Editor (bordered, fixed height)
//! - Suggestion overlay (remaining space, only while suggestions match)
//! - Status line (1 line, fixed)
//!
//! The action menu floats over everything at its anchor, relative to the
//! editor's inner area.
//!
//! Document layout is a pure function of the document and the editor width so
//! that mouse handling can map clicks back to segments without keeping render
//! state around.

use crate::app::App;
use formula::document::{Document, Segment, NBSP};
use formula::editor::{Bounds, MenuAction, Point};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

/// Lines of text visible in the editor
const EDITOR_LINES: u16 = 3;
/// Most suggestions shown at once
const OVERLAY_MAX_ITEMS: u16 = 8;

/// Screen regions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub title: Rect,
    pub editor: Rect,
    /// Editor area inside its border; document coordinates start here
    pub editor_inner: Rect,
    pub overlay: Rect,
    pub status: Rect,
}

impl Areas {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                // Title bar
                Constraint::Length(EDITOR_LINES + 2), // Editor
                Constraint::Min(0),                   // Overlay
                Constraint::Length(1),                // Status line
            ])
            .split(area);
        let editor_inner = Block::default().borders(Borders::ALL).inner(chunks[1]);
        Areas {
            title: chunks[0],
            editor: chunks[1],
            editor_inner,
            overlay: chunks[2],
            status: chunks[3],
        }
    }

    pub fn editor_origin(&self) -> Point {
        Point::new(self.editor_inner.x.into(), self.editor_inner.y.into())
    }
}

/// One caret unit placed on screen, relative to the editor's inner area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub segment: usize,
    /// Flat unit index in the document
    pub unit: usize,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub kind: PlacedKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacedKind {
    Char(char),
    /// Tag chip; `name_offset` is where the display name starts inside it
    Tag { label: String, name_offset: u16 },
}

impl Placed {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        y == self.y && x >= self.x && x < self.x.saturating_add(self.width)
    }

    /// The clickable name region of a tag chip
    pub fn name_contains(&self, x: u16, y: u16) -> bool {
        match &self.kind {
            PlacedKind::Tag { name_offset, .. } => {
                y == self.y
                    && x >= self.x.saturating_add(*name_offset)
                    && x < self.x.saturating_add(self.width)
            }
            PlacedKind::Char(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLayout {
    pub placed: Vec<Placed>,
    /// Caret cell, relative to the editor's inner area
    pub caret: (u16, u16),
}

impl DocumentLayout {
    pub fn tag_chip(&self, segment: usize) -> Option<&Placed> {
        self.placed
            .iter()
            .find(|p| p.segment == segment && matches!(p.kind, PlacedKind::Tag { .. }))
    }
}

/// Terminal cells for `count` items, capped at what a `u16` holds
fn cell_count(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

/// Chip text for a tag: ` category name `
fn chip_label(category: &str, name: &str) -> (String, u16) {
    let label = format!(" {} {} ", category, name);
    let name_offset = cell_count(category.chars().count()).saturating_add(2);
    (label, name_offset)
}

/// Place every unit of `document` in a box `width` cells wide, wrapping
/// before anything that would overflow a line.
pub fn layout_document(document: &Document, width: u16) -> DocumentLayout {
    let width = width.max(1);
    let mut placed = Vec::new();
    let (mut x, mut y) = (0u16, 0u16);
    let mut unit = 0;

    let mut place = |segment: usize, unit: usize, cells: u16, kind: PlacedKind, x: &mut u16, y: &mut u16| {
        if *x > 0 && x.saturating_add(cells) > width {
            *x = 0;
            *y = y.saturating_add(1);
        }
        placed.push(Placed {
            segment,
            unit,
            x: *x,
            y: *y,
            width: cells,
            kind,
        });
        *x = x.saturating_add(cells);
    };

    for (index, segment) in document.segments().iter().enumerate() {
        match segment {
            Segment::Text { content } => {
                for ch in content.chars() {
                    place(index, unit, 1, PlacedKind::Char(ch), &mut x, &mut y);
                    unit += 1;
                }
            }
            Segment::Tag(tag) => {
                let (label, name_offset) = chip_label(tag.category(), tag.display_name());
                let cells = cell_count(label.chars().count());
                place(index, unit, cells, PlacedKind::Tag { label, name_offset }, &mut x, &mut y);
                unit += 1;
            }
        }
    }

    let caret_units = document.caret_units();
    let caret = match caret_units.checked_sub(1).and_then(|i| placed.get(i)) {
        Some(last) if last.x.saturating_add(last.width) >= width => (0, last.y.saturating_add(1)),
        Some(last) => (last.x + last.width, last.y),
        None => (0, 0),
    };
    DocumentLayout { placed, caret }
}

/// Absolute bounds of a placed unit
pub fn placed_bounds(areas: &Areas, placed: &Placed) -> Bounds {
    let left = i32::from(areas.editor_inner.x) + i32::from(placed.x);
    let top = i32::from(areas.editor_inner.y) + i32::from(placed.y);
    Bounds::new(left, top, left + i32::from(placed.width), top + 1)
}

/// Text shown for a menu entry
pub fn action_label(action: &MenuAction) -> String {
    match action {
        MenuAction::Preset(name) => name.clone(),
        MenuAction::RestoreOriginal(name) => format!("{} (original)", name),
    }
}

/// Screen area of the action menu, kept inside `frame`
pub fn menu_area(areas: &Areas, frame: Rect, anchor: Point, actions: &[MenuAction]) -> Rect {
    let inner_width = actions
        .iter()
        .map(|a| action_label(a).chars().count())
        .max()
        .unwrap_or(0);
    let width = cell_count(inner_width).saturating_add(2).min(frame.width);
    let height = cell_count(actions.len()).saturating_add(2).min(frame.height);

    let x = i32::from(areas.editor_inner.x) + anchor.x;
    let y = i32::from(areas.editor_inner.y) + anchor.y;
    let max_x = i32::from(frame.x + frame.width - width);
    let max_y = i32::from(frame.y + frame.height - height);
    Rect::new(
        x.clamp(i32::from(frame.x), max_x.max(i32::from(frame.x))) as u16,
        y.clamp(i32::from(frame.y), max_y.max(i32::from(frame.y))) as u16,
        width,
        height,
    )
}

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.area();
    let areas = Areas::new(size);

    render_title_bar(frame, areas.title, app);
    render_editor(frame, &areas, app);
    render_overlay(frame, areas.overlay, app);
    render_status(frame, areas.status, app);
    render_action_menu(frame, &areas, size, app);
}

fn render_title_bar(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!("formula:: {}", app.catalog_state);
    let paragraph = Paragraph::new(title).style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(paragraph, area);
}

fn render_editor(frame: &mut Frame, areas: &Areas, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Formula");
    frame.render_widget(block, areas.editor);

    let inner = areas.editor_inner;
    let layout = layout_document(app.editor.document(), inner.width);
    let tag_style = Style::default().fg(Color::Black).bg(Color::LightBlue);
    let name_style = tag_style.add_modifier(Modifier::UNDERLINED);

    let buffer = frame.buffer_mut();
    for placed in layout.placed.iter().filter(|p| p.y < inner.height) {
        let (x, y) = (inner.x.saturating_add(placed.x), inner.y.saturating_add(placed.y));
        match &placed.kind {
            PlacedKind::Char(ch) => {
                let ch = if *ch == NBSP { ' ' } else { *ch };
                buffer.set_string(x, y, ch.to_string(), Style::default());
            }
            PlacedKind::Tag { label, name_offset } => {
                let split = usize::from(*name_offset);
                let category: String = label.chars().take(split).collect();
                let name: String = label.chars().skip(split).collect();
                buffer.set_string(x, y, category, tag_style);
                // A long category can push the name past the edge
                let name_x = x.saturating_add(*name_offset);
                if name_x < inner.right() {
                    buffer.set_string(name_x, y, name, name_style);
                }
            }
        }
    }

    if app.editor.is_focused() && !app.editor.action_menu().is_open() {
        let (cx, cy) = layout.caret;
        if cx < inner.width && cy < inner.height {
            frame.set_cursor_position(Position::new(inner.x + cx, inner.y + cy));
        }
    }
}

fn render_overlay(frame: &mut Frame, area: Rect, app: &App) {
    let suggestions = app.editor.suggestions();
    if suggestions.is_empty() || area.height < 3 {
        return;
    }

    let items: Vec<ListItem> = suggestions
        .iter()
        .map(|s| ListItem::new(format!("{} ({})", s.category, s.name)))
        .collect();
    let height = cell_count(suggestions.len()).min(OVERLAY_MAX_ITEMS) + 2;
    let area = Rect::new(area.x, area.y, area.width.min(40), height.min(area.height));

    let title = format!("Suggestions: {}", app.editor.session().search_term());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.highlighted.min(suggestions.len() - 1)));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match &app.status {
        Some(status) if status.is_error() => (status.to_string(), Style::default().fg(Color::Red)),
        Some(status) => (status.to_string(), Style::default().fg(Color::Green)),
        None => (
            "Ctrl+E evaluate | Ctrl+T tag menu | Ctrl+Q quit".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_action_menu(frame: &mut Frame, areas: &Areas, size: Rect, app: &App) {
    let Some(anchor) = app.editor.action_menu().anchor() else {
        return;
    };
    let actions = app.editor.menu_actions();
    let area = menu_area(areas, size, anchor, &actions);

    let items: Vec<ListItem> = actions.iter().map(|a| ListItem::new(action_label(a))).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let selected = app.menu_highlighted.min(actions.len().saturating_sub(1));
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula::document::TagToken;

    fn doc() -> Document {
        Document::from_segments(vec![
            Segment::text("1+"),
            Segment::tag(TagToken::new("1", "Revenue", "north")),
            Segment::spacer(),
        ])
    }

    #[test]
    fn test_layout_places_chip() {
        let layout = layout_document(&doc(), 40);
        assert_eq!(layout.placed.len(), 4);

        let chip = layout.tag_chip(1).unwrap();
        assert_eq!((chip.x, chip.y, chip.width), (2, 0, 15));
        assert!(chip.name_contains(11, 0));
        assert!(!chip.name_contains(4, 0));
        assert_eq!(layout.caret, (18, 0));
    }

    #[test]
    fn test_layout_wraps_whole_chip() {
        let layout = layout_document(&doc(), 10);
        let chip = layout.tag_chip(1).unwrap();
        assert_eq!((chip.x, chip.y), (0, 1));
    }

    #[test]
    fn test_layout_with_oversized_chip() {
        let category = "x".repeat(70_000);
        let document = Document::from_segments(vec![
            Segment::text("1+"),
            Segment::tag(TagToken::new("1", category, "north")),
            Segment::spacer(),
        ]);
        let layout = layout_document(&document, 40);

        let chip = layout.tag_chip(1).unwrap();
        assert_eq!((chip.x, chip.y, chip.width), (0, 1, u16::MAX));
        assert!(chip.contains(39, 1));
        assert!(!chip.name_contains(39, 1));

        let spacer = layout.placed.last().unwrap();
        assert_eq!((spacer.x, spacer.y), (0, 2));
    }

    #[test]
    fn test_menu_area_stays_on_screen() {
        let frame = Rect::new(0, 0, 30, 12);
        let areas = Areas::new(frame);
        let actions = vec![MenuAction::Preset("Action 1".into())];
        let area = menu_area(&areas, frame, Point::new(100, 1), &actions);
        assert_eq!(area.x + area.width, 30);
        assert_eq!(area.height, 3);
    }
}
