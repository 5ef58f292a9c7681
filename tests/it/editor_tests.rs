//! Pointer and keyboard gestures driven through `Editor::handle`.

use eframe::egui::{pos2, vec2};
use innolab::model::{Node, NodeKind, Shape};
use innolab::{InputEvent, Key, Modifiers, Response, Selection, Tool};

use crate::helpers::{SceneBuilder, assert_pos_eq, center_of, click, drag, drag_with};

#[test]
fn drawing_a_connection_adds_exactly_one_connection_and_one_entry() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).rect("b", 200.0, 0.0).editor();
    let before = editor.history().len();

    editor.set_tool(Tool::DrawConnection);
    let response = drag(&mut editor, pos2(0.0, 0.0), pos2(200.0, 0.0));

    assert_eq!(response, Response::Committed);
    let connections = &editor.scene().connections;
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].from, "a");
    assert_eq!(connections[0].to, "b");
    assert_eq!(editor.history().len(), before + 1);
    assert_eq!(editor.tool(), Tool::DrawConnection);
}

#[test]
fn connection_released_on_empty_space_or_source_is_discarded() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).rect("b", 200.0, 0.0).editor();
    editor.set_tool(Tool::DrawConnection);

    drag(&mut editor, pos2(0.0, 0.0), pos2(0.0, 400.0));
    drag(&mut editor, pos2(0.0, 0.0), pos2(10.0, 10.0));
    // Pressing on empty space never starts a connection.
    drag(&mut editor, pos2(100.0, 300.0), pos2(200.0, 0.0));

    assert!(editor.scene().connections.is_empty());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn text_edit_commits_once_on_command_enter() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    let before = editor.history().len();

    editor.handle(InputEvent::DoubleClick { pos: pos2(0.0, 0.0) });
    assert!(editor.text_edit().is_some());
    for c in ["H", "e", "l", "l", "o"] {
        editor.handle(InputEvent::Text(c.to_string()));
    }
    assert_eq!(editor.history().len(), before, "typing must not commit");

    let response = editor.handle(InputEvent::key_with(Key::Enter, Modifiers::COMMAND));

    assert_eq!(response, Response::Committed);
    assert_eq!(editor.scene().node("a").map(|n| n.text.as_str()), Some("Hello"));
    assert_eq!(editor.history().len(), before + 1);
    assert!(editor.text_edit().is_none());
}

#[test]
fn plain_enter_inserts_a_newline_and_escape_discards() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    editor.handle(InputEvent::DoubleClick { pos: pos2(0.0, 0.0) });
    editor.handle(InputEvent::Text("one".into()));
    editor.handle(InputEvent::key(Key::Enter));
    editor.handle(InputEvent::Text("two".into()));
    assert_eq!(editor.text_edit().map(|e| e.buffer.as_str()), Some("one\ntwo"));

    editor.handle(InputEvent::key(Key::Escape));

    assert!(editor.text_edit().is_none());
    assert_eq!(editor.scene().node("a").map(|n| n.text.as_str()), Some(""));
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn clicking_elsewhere_commits_pending_text() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    editor.handle(InputEvent::DoubleClick { pos: pos2(0.0, 0.0) });
    editor.handle(InputEvent::Text("Idea".into()));

    click(&mut editor, pos2(500.0, 500.0));

    assert_eq!(editor.scene().node("a").map(|n| n.text.as_str()), Some("Idea"));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn zoom_is_clamped_to_configured_bounds() {
    let mut editor = SceneBuilder::new().editor();
    for _ in 0..100 {
        editor.handle(InputEvent::Wheel {
            pos: pos2(100.0, 100.0),
            delta: vec2(0.0, 500.0),
        });
    }
    assert_eq!(editor.view().zoom, 3.0);

    for _ in 0..100 {
        editor.handle(InputEvent::Wheel {
            pos: pos2(100.0, 100.0),
            delta: vec2(0.0, -500.0),
        });
    }
    assert_eq!(editor.view().zoom, 0.1);

    let response = editor.handle(InputEvent::Wheel {
        pos: pos2(100.0, 100.0),
        delta: vec2(0.0, -500.0),
    });
    assert_eq!(response, Response::Ignored);
}

#[test]
fn dragging_a_grouped_node_moves_the_whole_group_rigidly() {
    let mut editor = SceneBuilder::new()
        .rect("n1", 0.0, 0.0)
        .rect("n2", 50.0, 0.0)
        .grouped("g1", &["n1", "n2"])
        .editor();

    let response = drag(&mut editor, pos2(0.0, 0.0), pos2(10.0, 10.0));

    assert_eq!(response, Response::Committed);
    assert_pos_eq(center_of(&editor, "n1"), pos2(10.0, 10.0));
    assert_pos_eq(center_of(&editor, "n2"), pos2(60.0, 10.0));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn a_locked_member_pins_its_whole_group() {
    let mut b = Node::shape("b", Shape::Rect, pos2(300.0, 0.0)).with_size(100.0, 100.0);
    b.locked = true;
    let mut editor = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .node(b)
        .grouped("g1", &["a", "b"])
        .editor();
    let before = editor.history().len();

    let response = drag(&mut editor, pos2(0.0, 0.0), pos2(10.0, 10.0));

    assert_ne!(response, Response::Committed);
    assert_pos_eq(center_of(&editor, "a"), pos2(0.0, 0.0));
    assert_pos_eq(center_of(&editor, "b"), pos2(300.0, 0.0));

    editor.handle(InputEvent::key(Key::ArrowRight));
    assert_pos_eq(center_of(&editor, "a"), pos2(0.0, 0.0));
    assert_eq!(editor.history().len(), before);
}

#[test]
fn drag_that_returns_to_its_start_commits_nothing() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    editor.handle(InputEvent::down(pos2(0.0, 0.0)));
    editor.handle(InputEvent::moved(pos2(50.0, 0.0)));
    editor.handle(InputEvent::moved(pos2(0.0, 0.0)));

    let response = editor.handle(InputEvent::up(pos2(0.0, 0.0)));

    assert_eq!(response, Response::Changed);
    assert_pos_eq(center_of(&editor, "a"), pos2(0.0, 0.0));
    assert_eq!(editor.history().len(), 1);
    assert_eq!(editor.selection().single_node(), Some("a"));
}

#[test]
fn area_selection_starts_inside_a_zone_and_its_title_drags_it() {
    let zone = Node::new("z", NodeKind::Zone, pos2(0.0, 0.0));
    let mut editor = SceneBuilder::new().node(zone).rect("n", 80.0, 60.0).editor();

    drag(&mut editor, pos2(-150.0, -50.0), pos2(150.0, 130.0));
    assert_pos_eq(center_of(&editor, "z"), pos2(0.0, 0.0));
    assert_eq!(editor.selection().single_node(), Some("n"));

    let response = drag(&mut editor, pos2(0.0, -140.0), pos2(0.0, -100.0));
    assert_eq!(response, Response::Committed);
    assert_pos_eq(center_of(&editor, "z"), pos2(0.0, 40.0));
    assert_eq!(editor.selection().single_node(), Some("z"));
}

#[test]
fn undo_during_text_edit_keeps_the_typed_text_undoable() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    editor.handle(InputEvent::DoubleClick { pos: pos2(0.0, 0.0) });
    editor.handle(InputEvent::Text("Hi".to_string()));

    assert!(editor.undo());
    assert!(editor.text_edit().is_none());
    assert_eq!(editor.history().len(), 2);
    let original = editor.scene().node("a").map(|n| n.text.clone());

    assert!(editor.redo());
    assert_eq!(editor.scene().node("a").map(|n| n.text.as_str()), Some("Hi"));
    assert_ne!(original.as_deref(), Some("Hi"));
}

#[test]
fn movement_within_the_drag_threshold_is_a_click() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();

    let response = drag(&mut editor, pos2(0.0, 0.0), pos2(1.0, 1.0));

    assert_eq!(response, Response::Changed);
    assert_pos_eq(center_of(&editor, "a"), pos2(0.0, 0.0));
    assert_eq!(editor.selection().single_node(), Some("a"));
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn escape_mid_drag_puts_nodes_back() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    editor.handle(InputEvent::down(pos2(0.0, 0.0)));
    editor.handle(InputEvent::moved(pos2(40.0, 0.0)));
    assert_pos_eq(center_of(&editor, "a"), pos2(40.0, 0.0));

    editor.handle(InputEvent::key(Key::Escape));
    editor.handle(InputEvent::up(pos2(40.0, 0.0)));

    assert_pos_eq(center_of(&editor, "a"), pos2(0.0, 0.0));
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn selection_box_selects_only_fully_enclosed_nodes() {
    let mut editor = SceneBuilder::new().rect("n", 100.0, 100.0).editor();

    drag(&mut editor, pos2(40.0, 40.0), pos2(160.0, 160.0));
    assert!(editor.selection().contains_node("n"));

    editor.handle(InputEvent::key(Key::Escape));
    assert!(editor.selection().is_empty());

    // Overlaps the node's bounds but leaves its top edge outside.
    drag(&mut editor, pos2(20.0, 60.0), pos2(160.0, 160.0));
    assert!(editor.selection().is_empty());
}

#[test]
fn selection_box_pulls_in_whole_groups() {
    let mut editor = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .rect("b", 400.0, 0.0)
        .grouped("g", &["a", "b"])
        .editor();

    drag(&mut editor, pos2(-60.0, -60.0), pos2(60.0, 60.0));

    assert_eq!(editor.selection().node_count(), 2);
}

#[test]
fn shift_click_toggles_membership() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).rect("b", 300.0, 0.0).editor();
    click(&mut editor, pos2(0.0, 0.0));
    drag_with(&mut editor, pos2(300.0, 0.0), pos2(300.0, 0.0), Modifiers::SHIFT);
    assert_eq!(editor.selection().node_count(), 2);

    drag_with(&mut editor, pos2(0.0, 0.0), pos2(0.0, 0.0), Modifiers::SHIFT);
    assert_eq!(editor.selection().single_node(), Some("b"));
}

#[test]
fn corner_handle_resizes_around_the_opposite_corner() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    click(&mut editor, pos2(0.0, 0.0));

    let response = drag(&mut editor, pos2(50.0, 50.0), pos2(80.0, 70.0));

    assert_eq!(response, Response::Committed);
    let node = editor.scene().node("a").cloned().unwrap();
    assert_eq!((node.width, node.height), (Some(130.0), Some(120.0)));
    assert_pos_eq(node.center(), pos2(15.0, 10.0));
}

#[test]
fn resize_never_goes_below_the_minimum_size() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    click(&mut editor, pos2(0.0, 0.0));

    drag(&mut editor, pos2(50.0, 50.0), pos2(-300.0, -300.0));

    let node = editor.scene().node("a").cloned().unwrap();
    assert_eq!((node.width, node.height), (Some(20.0), Some(20.0)));
    assert_pos_eq(node.center(), pos2(-40.0, -40.0));
}

#[test]
fn locked_nodes_select_but_do_not_move_or_delete() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    click(&mut editor, pos2(0.0, 0.0));
    assert!(editor.set_locked(true));

    drag(&mut editor, pos2(0.0, 0.0), pos2(50.0, 50.0));
    assert_pos_eq(center_of(&editor, "a"), pos2(0.0, 0.0));
    assert_eq!(editor.selection().single_node(), Some("a"));

    assert_eq!(editor.handle(InputEvent::key(Key::Delete)), Response::Ignored);
    assert!(editor.scene().node("a").is_some());
    assert!(!editor.begin_text_edit("a"));
}

#[test]
fn space_drag_pans_without_touching_the_scene() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    editor.handle(InputEvent::key(Key::Space));

    drag(&mut editor, pos2(0.0, 0.0), pos2(30.0, 40.0));
    editor.handle(InputEvent::KeyUp { key: Key::Space });

    assert_eq!(editor.view().pan, vec2(30.0, 40.0));
    assert_pos_eq(center_of(&editor, "a"), pos2(0.0, 0.0));
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.is_space_held());
}

#[test]
fn freehand_stroke_becomes_a_path_and_restores_the_tool() {
    let mut editor = SceneBuilder::new().editor();
    editor.set_tool(Tool::DrawConnection);
    editor.set_tool(Tool::DrawFreehand);

    editor.handle(InputEvent::down(pos2(0.0, 0.0)));
    editor.handle(InputEvent::moved(pos2(10.0, 0.0)));
    editor.handle(InputEvent::moved(pos2(20.0, 5.0)));
    let response = editor.handle(InputEvent::up(pos2(20.0, 5.0)));

    assert_eq!(response, Response::Committed);
    assert_eq!(editor.scene().paths.len(), 1);
    assert_eq!(editor.scene().paths[0].points.len(), 3);
    assert_eq!(editor.tool(), Tool::DrawConnection);
}

#[test]
fn single_point_stroke_is_dropped() {
    let mut editor = SceneBuilder::new().editor();
    editor.set_tool(Tool::DrawFreehand);

    click(&mut editor, pos2(5.0, 5.0));

    assert!(editor.scene().paths.is_empty());
    assert_eq!(editor.history().len(), 1);
    assert_eq!(editor.tool(), Tool::Select);
}

#[test]
fn placing_a_shape_commits_and_returns_to_select() {
    let mut editor = SceneBuilder::new().editor();
    editor.handle(InputEvent::key(Key::Char('r')));
    assert_eq!(editor.tool(), Tool::AddShape(Shape::Rect));

    let response = click(&mut editor, pos2(120.0, 80.0));

    assert_eq!(response, Response::Committed);
    assert_eq!(editor.tool(), Tool::Select);
    let node = &editor.scene().nodes[0];
    assert_pos_eq(node.center(), pos2(120.0, 80.0));
    assert_eq!(editor.selection().single_node(), Some(node.id.as_str()));
}

#[test]
fn placing_text_opens_the_inline_editor() {
    let mut editor = SceneBuilder::new().editor();
    editor.set_tool(Tool::AddText);

    editor.handle(InputEvent::down(pos2(0.0, 0.0)));

    let id = editor.scene().nodes[0].id.clone();
    assert_eq!(editor.text_edit().map(|e| e.node_id.clone()), Some(id));
}

#[test]
fn deleting_a_node_keeps_its_connections() {
    let mut editor = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .rect("b", 300.0, 0.0)
        .connect("c1", "a", "b")
        .editor();
    click(&mut editor, pos2(0.0, 0.0));

    assert_eq!(editor.handle(InputEvent::key(Key::Backspace)), Response::Committed);

    assert!(editor.scene().node("a").is_none());
    assert_eq!(editor.scene().dangling_connections().len(), 1);
    assert_eq!(editor.prune_dangling_connections(), 1);
    assert!(editor.scene().connections.is_empty());
}

#[test]
fn clicking_a_connection_selects_it() {
    let mut editor = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .rect("b", 300.0, 0.0)
        .connect("c1", "a", "b")
        .editor();

    click(&mut editor, pos2(150.0, 0.0));

    assert_eq!(editor.selection(), &Selection::Connection("c1".into()));
    editor.handle(InputEvent::key(Key::Delete));
    assert!(editor.scene().connections.is_empty());
}

#[test]
fn duplicate_offsets_copies_and_selects_them() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    click(&mut editor, pos2(0.0, 0.0));

    editor.handle(InputEvent::key_with(Key::Char('d'), Modifiers::COMMAND));

    assert_eq!(editor.scene().nodes.len(), 2);
    let copy = editor.selection().single_node().map(str::to_string).unwrap();
    assert_ne!(copy, "a");
    assert_pos_eq(center_of(&editor, &copy), pos2(20.0, 20.0));
}

#[test]
fn arrow_keys_nudge_the_selection() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    click(&mut editor, pos2(0.0, 0.0));

    editor.handle(InputEvent::key(Key::ArrowRight));
    editor.handle(InputEvent::key_with(Key::ArrowDown, Modifiers::SHIFT));

    assert_pos_eq(center_of(&editor, "a"), pos2(1.0, 10.0));
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn group_then_ungroup_by_shortcut() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).rect("b", 300.0, 0.0).editor();
    editor.handle(InputEvent::key_with(Key::Char('a'), Modifiers::COMMAND));

    editor.handle(InputEvent::key_with(Key::Char('g'), Modifiers::COMMAND));
    let groups: Vec<_> = editor.scene().nodes.iter().map(|n| n.group_id.clone()).collect();
    assert!(groups[0].is_some());
    assert_eq!(groups[0], groups[1]);

    editor.handle(InputEvent::key_with(Key::Char('g'), Modifiers::COMMAND_SHIFT));
    assert!(editor.scene().nodes.iter().all(|n| n.group_id.is_none()));
}
