//! Scene builders and input shorthands shared by the integration tests.

use eframe::egui::{Pos2, pos2};
use innolab::model::{Connection, Node, Shape};
use innolab::settings::EditorSettings;
use innolab::{Editor, InputEvent, Modifiers, Response, Scene};

/// Builder for scenes made of fixed-size rectangles.
#[derive(Default)]
pub struct SceneBuilder {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A 100x100 rectangle centered at `(x, y)`.
    pub fn rect(mut self, id: &str, x: f32, y: f32) -> Self {
        self.nodes
            .push(Node::shape(id, Shape::Rect, pos2(x, y)).with_size(100.0, 100.0));
        self
    }

    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn grouped(mut self, group_id: &str, ids: &[&str]) -> Self {
        for node in self.nodes.iter_mut().filter(|n| ids.contains(&n.id.as_str())) {
            node.group_id = Some(group_id.to_string());
        }
        self
    }

    pub fn connect(mut self, id: &str, from: &str, to: &str) -> Self {
        self.connections.push(Connection::new(id, from, to));
        self
    }

    pub fn build(self) -> Scene {
        Scene::new(self.nodes, self.connections, Vec::new())
    }

    /// An editor whose history baseline is this scene. The default view maps
    /// screen positions straight onto world positions.
    pub fn editor(self) -> Editor {
        Editor::with_scene(self.build(), EditorSettings::default())
    }
}

/// Press at `from`, move to `to`, release at `to`.
pub fn drag(editor: &mut Editor, from: Pos2, to: Pos2) -> Response {
    drag_with(editor, from, to, Modifiers::NONE)
}

pub fn drag_with(editor: &mut Editor, from: Pos2, to: Pos2, modifiers: Modifiers) -> Response {
    let mut response = editor.handle(InputEvent::PointerDown {
        pos: from,
        modifiers,
    });
    response = response.max(editor.handle(InputEvent::PointerMove { pos: to, modifiers }));
    response.max(editor.handle(InputEvent::PointerUp { pos: to, modifiers }))
}

pub fn click(editor: &mut Editor, at: Pos2) -> Response {
    editor.handle(InputEvent::down(at)).max(editor.handle(InputEvent::up(at)))
}

pub fn center_of(editor: &Editor, id: &str) -> Pos2 {
    editor
        .scene()
        .node(id)
        .map(|n| n.center())
        .unwrap_or_else(|| panic!("no node {id}"))
}

pub fn assert_pos_eq(actual: Pos2, expected: Pos2) {
    assert!(
        (actual - expected).length() < 1e-3,
        "expected {expected:?}, got {actual:?}"
    );
}
