//! Persistence through `FileStore` and the editor's save/load entry points.

use eframe::egui::pos2;
use innolab::error::StoreError;
use innolab::model::{NodeKind, Shape};
use innolab::notify::NoticeLevel;
use innolab::store::{self, FileStore, SavedScene, SceneStore};
use innolab::templates::DiagramType;
use innolab::{Editor, Scene};

use crate::helpers::SceneBuilder;

#[test]
fn editor_save_then_load_restores_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let mut editor = Editor::default();
    editor.switch_diagram_type(DiagramType::Swot);
    editor.add_node(NodeKind::Generic { shape: Shape::Hexagon }, pos2(10.0, 20.0));
    editor.set_name("plan");
    editor.drain_notices();

    assert!(editor.save(&store, false));
    let saved_scene = editor.scene().clone();
    assert_eq!(editor.drain_notices()[0].level, NoticeLevel::Success);

    let mut other = Editor::default();
    assert!(other.load(&store, "plan"));

    assert_eq!(other.scene(), &saved_scene);
    assert_eq!(other.diagram_type(), DiagramType::Swot);
    assert_eq!(other.name(), "plan");
    assert!(other.undo(), "loading is undoable");
    assert!(other.scene().is_empty());
}

#[test]
fn list_is_sorted_and_delete_removes() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested"));
    assert!(store.list().unwrap().is_empty());

    for name in ["beta", "alpha"] {
        store
            .save(&SavedScene::new(name, DiagramType::Freeform, Scene::default()))
            .unwrap();
    }
    assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);

    store.delete("alpha").unwrap();
    assert_eq!(store.list().unwrap(), vec!["beta"]);
    assert!(matches!(store.delete("alpha"), Err(StoreError::NotFound(_))));
    assert!(matches!(store.load("alpha"), Err(StoreError::NotFound(_))));
}

#[test]
fn failed_load_leaves_the_scene_and_reports_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();

    assert!(!editor.load(&store, "missing"));

    assert!(editor.scene().node("a").is_some());
    let notices = editor.drain_notices();
    assert_eq!(notices.last().map(|n| n.level), Some(NoticeLevel::Error));
}

#[test]
fn saving_with_pruning_drops_dangling_connections() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let mut editor = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .connect("c", "a", "gone")
        .editor();
    editor.set_name("pruned");

    assert!(editor.save(&store, true));

    assert!(store.load("pruned").unwrap().scene.connections.is_empty());
}

#[test]
fn hand_written_document_loads_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(
        &path,
        r##"{
            "name": "board",
            "type": "mindmap",
            "nodes": [
                { "id": "n1", "type": "root", "shape": "pill", "x": 0, "y": 0, "text": "Hub" },
                { "id": "n2", "type": "sticker", "x": 200, "y": 0,
                  "style": { "fill": "#ffcc00" }, "groupId": "g1" }
            ],
            "connections": [
                { "id": "c1", "from": "n1", "to": "n2", "route": "step", "endMarker": "circle" }
            ]
        }"##,
    )
    .unwrap();

    let saved = store::load_from_file(&path).unwrap();

    assert_eq!(saved.diagram_type, DiagramType::Mindmap);
    assert_eq!(saved.timestamp, 0);
    assert!(saved.scene.paths.is_empty());
    let hub = saved.scene.node("n1").unwrap();
    assert_eq!(hub.kind, NodeKind::Root { shape: Shape::Pill });
    assert_eq!(hub.text, "Hub");
    let sticker = saved.scene.node("n2").unwrap();
    assert_eq!(sticker.group_id.as_deref(), Some("g1"));
    assert_eq!(sticker.style.fill.map(|c| c.to_hex()), Some("#ffcc00".to_string()));
    let connection = &saved.scene.connections[0];
    assert_eq!(connection.style.route, innolab::model::Route::Step);
    assert_eq!(connection.style.end_marker, innolab::model::Marker::Circle);
}

#[test]
fn invalid_names_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());

    let result = store.save(&SavedScene::new("../escape", DiagramType::Freeform, Scene::default()));

    assert!(matches!(result, Err(StoreError::InvalidName(_))));
}

#[test]
fn svg_export_writes_the_rendered_scene() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.svg");
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();

    assert!(editor.export_image(&path, 1.0));

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, editor.to_svg());
}
