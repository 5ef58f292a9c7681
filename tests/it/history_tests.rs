//! Undo and redo as seen through the editor.

use eframe::egui::pos2;
use innolab::model::{NodeKind, Shape};
use innolab::settings::EditorSettings;
use innolab::{Editor, InputEvent, Key, Modifiers, Scene};

use crate::helpers::{SceneBuilder, drag};

#[test]
fn undo_all_then_redo_all_round_trips_the_scene() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    let baseline = editor.scene().clone();

    drag(&mut editor, pos2(0.0, 0.0), pos2(100.0, 0.0));
    editor.add_node(NodeKind::Generic { shape: Shape::Circle }, pos2(400.0, 0.0));
    editor.set_tool(innolab::Tool::DrawFreehand);
    drag(&mut editor, pos2(0.0, 300.0), pos2(50.0, 300.0));
    let latest = editor.scene().clone();
    let steps = editor.history().index();
    assert_eq!(steps, 3);

    for _ in 0..steps {
        assert!(editor.undo());
    }
    assert!(!editor.can_undo());
    assert_eq!(editor.scene(), &baseline);

    for _ in 0..steps {
        assert!(editor.redo());
    }
    assert!(!editor.can_redo());
    assert_eq!(editor.scene(), &latest);
}

#[test]
fn committing_after_undo_discards_the_redo_tail() {
    let mut editor = Editor::with_scene(Scene::default(), EditorSettings::default());
    let b = editor.add_node(NodeKind::Text, pos2(0.0, 0.0));
    let c = editor.add_node(NodeKind::Zone, pos2(500.0, 0.0));

    editor.handle(InputEvent::key_with(Key::Char('z'), Modifiers::COMMAND));
    assert!(editor.scene().node(&c).is_none());

    let d = editor.add_node(NodeKind::Label, pos2(0.0, 200.0));

    assert_eq!(editor.history().len(), 3);
    assert!(!editor.can_redo());
    let ids: Vec<&str> = editor.scene().nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec![b.as_str(), d.as_str()]);
}

#[test]
fn redo_shortcuts_are_equivalent() {
    let mut editor = Editor::default();
    editor.add_node(NodeKind::Text, pos2(0.0, 0.0));
    editor.add_node(NodeKind::Text, pos2(0.0, 100.0));
    editor.undo();
    editor.undo();

    editor.handle(InputEvent::key_with(Key::Char('z'), Modifiers::COMMAND_SHIFT));
    editor.handle(InputEvent::key_with(Key::Char('y'), Modifiers::COMMAND));

    assert_eq!(editor.scene().nodes.len(), 2);
}

#[test]
fn undo_at_baseline_is_a_no_op() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();

    assert!(!editor.undo());
    assert!(!editor.redo());
    assert_eq!(editor.scene().nodes.len(), 1);
}

#[test]
fn undo_drops_selection_of_nodes_that_disappear() {
    let mut editor = Editor::default();
    let id = editor.add_node(NodeKind::Text, pos2(0.0, 0.0));
    assert!(editor.selection().contains_node(&id));

    editor.undo();

    assert!(editor.selection().is_empty());
}

#[test]
fn history_respects_the_configured_limit() {
    let settings = EditorSettings {
        history_limit: 5,
        ..EditorSettings::default()
    };
    let mut editor = Editor::new(settings);
    for i in 0..10 {
        editor.add_node(NodeKind::Text, pos2(0.0, i as f32 * 50.0));
    }

    assert_eq!(editor.history().len(), 5);
    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, 4);
    assert_eq!(editor.scene().nodes.len(), 6);
}

#[test]
fn switching_templates_is_undoable() {
    let mut editor = SceneBuilder::new().rect("mine", 0.0, 0.0).editor();

    editor.switch_diagram_type(innolab::templates::DiagramType::Swot);
    assert!(editor.scene().node("mine").is_none());

    editor.undo();
    assert!(editor.scene().node("mine").is_some());
}
