//! Tag action menu
//!
//! Clicking a tag's name opens a small menu next to it. The menu offers the
//! preset rename labels and, when the tag's id has a recorded original name,
//! an entry restoring it. Choosing an entry renames every tag with that id in
//! the document and closes the menu.
//!
//! States and transitions:
//!
//! ```text
//! Closed      --click tag(id)-------> Open(id)
//! Open(id)    --click tag(id2)------> Open(id2)
//! Open(id)    --select action-------> Closed   (rename applied first)
//! Open(id)    --outside click-------> Closed
//! ```

use super::observer::{Bounds, Point};

/// Rename labels offered for every tag
pub const DEFAULT_PRESETS: [&str; 2] = ["Action 1", "Action 2"];

/// Horizontal gap between a tag's right edge and its menu
pub const DEFAULT_ANCHOR_OFFSET: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionMenu {
    #[default]
    Closed,
    Open { tag_id: String, anchor: Point },
}

impl ActionMenu {
    pub fn is_open(&self) -> bool {
        matches!(self, ActionMenu::Open { .. })
    }

    pub fn tag_id(&self) -> Option<&str> {
        match self {
            ActionMenu::Open { tag_id, .. } => Some(tag_id),
            ActionMenu::Closed => None,
        }
    }

    pub fn anchor(&self) -> Option<Point> {
        match self {
            ActionMenu::Open { anchor, .. } => Some(*anchor),
            ActionMenu::Closed => None,
        }
    }

    /// Open for `tag_id`, replacing whatever was open before
    pub fn open(&mut self, tag_id: impl Into<String>, anchor: Point) {
        *self = ActionMenu::Open {
            tag_id: tag_id.into(),
            anchor,
        };
    }

    /// Close the menu. Returns whether it was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        *self = ActionMenu::Closed;
        was_open
    }
}

/// One entry of the action menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Rename to a fixed label
    Preset(String),
    /// Rename back to the name recorded at first insertion
    RestoreOriginal(String),
}

impl MenuAction {
    /// Text shown in the menu; also the name the tag receives
    pub fn label(&self) -> &str {
        match self {
            MenuAction::Preset(name) | MenuAction::RestoreOriginal(name) => name,
        }
    }
}

/// Menu entries in display order
pub fn actions_for(presets: &[String], original_name: Option<&str>) -> Vec<MenuAction> {
    let mut actions: Vec<MenuAction> = presets.iter().cloned().map(MenuAction::Preset).collect();
    if let Some(name) = original_name {
        actions.push(MenuAction::RestoreOriginal(name.to_string()));
    }
    actions
}

/// Menu position for a clicked tag, relative to the editor's origin
pub fn anchor_for(tag: Bounds, editor_origin: Point, gap: i32) -> Point {
    Point {
        x: tag.right - editor_origin.x + gap,
        y: tag.top - editor_origin.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presets() -> Vec<String> {
        DEFAULT_PRESETS.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_state_transitions() {
        let mut menu = ActionMenu::default();
        assert!(!menu.is_open());

        menu.open("a", Point::new(1, 2));
        assert_eq!(menu.tag_id(), Some("a"));
        assert_eq!(menu.anchor(), Some(Point::new(1, 2)));

        menu.open("b", Point::new(3, 4));
        assert_eq!(menu.tag_id(), Some("b"));

        assert!(menu.close());
        assert_eq!(menu, ActionMenu::Closed);
        assert!(!menu.close());
    }

    #[test]
    fn test_actions_without_original() {
        let actions = actions_for(&presets(), None);
        let labels: Vec<&str> = actions.iter().map(MenuAction::label).collect();
        assert_eq!(labels, vec!["Action 1", "Action 2"]);
    }

    #[test]
    fn test_actions_with_original() {
        let actions = actions_for(&presets(), Some("north"));
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[2], MenuAction::RestoreOriginal("north".into()));
    }

    #[test]
    fn test_anchor_relative_to_editor() {
        let tag = Bounds::new(20, 7, 32, 8);
        let origin = Point::new(2, 5);
        assert_eq!(anchor_for(tag, origin, DEFAULT_ANCHOR_OFFSET), Point::new(35, 2));
    }
}
