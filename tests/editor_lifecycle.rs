//! Mount and unmount behavior of the outside-click listener

use std::panic::{self, AssertUnwindSafe};

use formula::editor::{Bounds, ClickDispatcher, Editor, EditorSettings, Point, PointerClick};

#[test]
fn test_listener_lives_as_long_as_editor() {
    let clicks = ClickDispatcher::new();
    assert_eq!(clicks.listener_count(), 0);

    let editor = Editor::mount(&clicks, EditorSettings::default());
    assert_eq!(clicks.listener_count(), 1);
    assert_eq!(clicks.dispatch(&PointerClick::at(0, 0)), 1);

    drop(editor);
    assert_eq!(clicks.listener_count(), 0);
    assert_eq!(clicks.dispatch(&PointerClick::at(0, 0)), 0);
}

#[test]
fn test_listener_released_on_unwind() {
    let clicks = ClickDispatcher::new();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut editor = Editor::mount(&clicks, EditorSettings::default());
        editor.type_text("1+");
        assert_eq!(clicks.listener_count(), 1);
        panic!("host failed while the editor was mounted");
    }));

    assert!(result.is_err());
    assert_eq!(clicks.listener_count(), 0);
}

#[test]
fn test_editors_do_not_share_menus() {
    let clicks = ClickDispatcher::new();
    let mut first = Editor::mount(&clicks, EditorSettings::default());
    let second = Editor::mount(&clicks, EditorSettings::default());
    assert_eq!(clicks.listener_count(), 2);

    first.set_catalog(formula::catalog::Catalog::new(vec![
        formula::catalog::Suggestion::new("1", "north", "Revenue", 5),
    ]));
    first.type_text("rev");
    first.select_suggestion("1").unwrap();
    first.click_tag(0, Bounds::default(), Point::default());

    assert!(first.action_menu().is_open());
    assert!(!second.action_menu().is_open());
    assert!(second.document().is_empty());

    clicks.dispatch(&PointerClick::at(9, 9));
    assert!(!first.action_menu().is_open());
}

#[test]
fn test_editor_outlives_dispatcher() {
    let clicks = ClickDispatcher::new();
    let mut editor = Editor::mount(&clicks, EditorSettings::default());
    drop(clicks);

    editor.type_text("2+2");
    assert_eq!(editor.evaluate().unwrap().value, 4.0);
}

#[test]
fn test_failing_host_listener_does_not_unmount_editor() {
    let clicks = ClickDispatcher::new();
    let mut editor = Editor::mount(&clicks, EditorSettings::default());
    let failing = clicks.subscribe(|_| panic!("host listener failed"));
    assert_eq!(clicks.listener_count(), 2);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        clicks.dispatch(&PointerClick::at(0, 0));
    }));
    assert!(result.is_err());
    assert_eq!(clicks.listener_count(), 2);

    drop(failing);
    assert_eq!(clicks.listener_count(), 1);

    editor.set_catalog(formula::catalog::Catalog::new(vec![
        formula::catalog::Suggestion::new("1", "north", "Revenue", 5),
    ]));
    editor.type_text("rev");
    editor.select_suggestion("1").unwrap();
    editor.click_tag(0, Bounds::default(), Point::default());
    assert!(editor.action_menu().is_open());

    clicks.dispatch(&PointerClick::at(9, 9));
    assert!(!editor.action_menu().is_open());
}
