use eframe::egui;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::{Connection, FreehandPath, Node};

/// The persisted part of a diagram: everything undo/redo snapshots.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub paths: Vec<FreehandPath>,
}

impl Scene {
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>, paths: Vec<FreehandPath>) -> Self {
        Self {
            nodes,
            connections,
            paths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty() && self.paths.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn path(&self, id: &str) -> Option<&FreehandPath> {
        self.paths.iter().find(|p| p.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.node(id).is_some() || self.connection(id).is_some() || self.path(id).is_some()
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.node_index(id)?;
        Some(self.nodes.remove(idx))
    }

    pub fn update_node(&mut self, id: &str, f: impl FnOnce(&mut Node)) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub fn remove_connection(&mut self, id: &str) -> Option<Connection> {
        let idx = self.connections.iter().position(|c| c.id == id)?;
        Some(self.connections.remove(idx))
    }

    pub fn update_connection(&mut self, id: &str, f: impl FnOnce(&mut Connection)) -> bool {
        match self.connections.iter_mut().find(|c| c.id == id) {
            Some(connection) => {
                f(connection);
                true
            }
            None => false,
        }
    }

    pub fn add_path(&mut self, path: FreehandPath) {
        self.paths.push(path);
    }

    pub fn remove_path(&mut self, id: &str) -> Option<FreehandPath> {
        let idx = self.paths.iter().position(|p| p.id == id)?;
        Some(self.paths.remove(idx))
    }

    pub fn replace(&mut self, nodes: Vec<Node>, connections: Vec<Connection>, paths: Vec<FreehandPath>) {
        self.nodes = nodes;
        self.connections = connections;
        self.paths = paths;
    }

    /// Connections whose `from` or `to` no longer resolves to a node.
    pub fn dangling_connections(&self) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|c| self.node(&c.from).is_none() || self.node(&c.to).is_none())
            .collect()
    }

    /// Drops dangling connections; returns how many were removed.
    pub fn prune_dangling_connections(&mut self) -> usize {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let before = self.connections.len();
        self.connections
            .retain(|c| ids.contains(c.from.as_str()) && ids.contains(c.to.as_str()));
        before - self.connections.len()
    }

    pub fn group_members(&self, group_id: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.group_id.as_deref() == Some(group_id))
            .collect()
    }

    pub fn group_ids(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for n in &self.nodes {
            if let Some(g) = &n.group_id {
                if !out.contains(g) {
                    out.push(g.clone());
                }
            }
        }
        out
    }

    /// `ids` plus every node sharing a group with one of them.
    pub fn expand_to_groups(&self, ids: &HashSet<String>) -> HashSet<String> {
        let groups: HashSet<&str> = self
            .nodes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .filter_map(|n| n.group_id.as_deref())
            .collect();
        let mut out = ids.clone();
        for n in &self.nodes {
            if n.group_id.as_deref().is_some_and(|g| groups.contains(g)) {
                out.insert(n.id.clone());
            }
        }
        out
    }

    /// Gives every listed node the same `group_id`. Needs at least two
    /// existing nodes.
    pub fn group_nodes(&mut self, ids: &HashSet<String>, group_id: String) -> bool {
        let count = self.nodes.iter().filter(|n| ids.contains(&n.id)).count();
        if count < 2 {
            return false;
        }
        for n in &mut self.nodes {
            if ids.contains(&n.id) {
                n.group_id = Some(group_id.clone());
            }
        }
        true
    }

    pub fn ungroup_nodes(&mut self, ids: &HashSet<String>) -> bool {
        let mut changed = false;
        for n in &mut self.nodes {
            if ids.contains(&n.id) && n.group_id.is_some() {
                n.group_id = None;
                changed = true;
            }
        }
        changed
    }

    pub fn bring_to_front(&mut self, id: &str) -> bool {
        let Some(idx) = self.node_index(id) else {
            return false;
        };
        if idx + 1 == self.nodes.len() {
            return false;
        }
        let node = self.nodes.remove(idx);
        self.nodes.push(node);
        true
    }

    pub fn send_to_back(&mut self, id: &str) -> bool {
        let Some(idx) = self.node_index(id) else {
            return false;
        };
        if idx == 0 {
            return false;
        }
        let node = self.nodes.remove(idx);
        self.nodes.insert(0, node);
        true
    }

    pub fn move_layer_up(&mut self, id: &str) -> bool {
        match self.node_index(id) {
            Some(idx) if idx + 1 < self.nodes.len() => {
                self.nodes.swap(idx, idx + 1);
                true
            }
            _ => false,
        }
    }

    pub fn move_layer_down(&mut self, id: &str) -> bool {
        match self.node_index(id) {
            Some(idx) if idx > 0 => {
                self.nodes.swap(idx, idx - 1);
                true
            }
            _ => false,
        }
    }

    /// Current centers of the nodes in `ids` that a drag may move. A group
    /// moves as one unit or not at all, so one locked or hidden member pins
    /// the rest of its group.
    pub fn drag_origins(&self, ids: &HashSet<String>) -> Vec<(String, egui::Pos2)> {
        let pinned: HashSet<&str> = self
            .nodes
            .iter()
            .filter(|n| !n.is_movable())
            .filter_map(|n| n.group_id.as_deref())
            .collect();
        self.nodes
            .iter()
            .filter(|n| ids.contains(&n.id) && n.is_movable())
            .filter(|n| n.group_id.as_deref().is_none_or(|g| !pinned.contains(g)))
            .map(|n| (n.id.clone(), n.center()))
            .collect()
    }

    /// Puts each node at its recorded origin plus `delta`.
    pub fn translate_nodes(&mut self, origins: &[(String, egui::Pos2)], delta: egui::Vec2) {
        for (id, origin) in origins {
            if let Some(node) = self.node_mut(id) {
                node.set_center(*origin + delta);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    Node,
    Connection,
    Path,
    Group,
}

impl IdKind {
    fn prefix(self) -> &'static str {
        match self {
            IdKind::Node => "node",
            IdKind::Connection => "conn",
            IdKind::Path => "path",
            IdKind::Group => "group",
        }
    }
}

/// Allocates `prefix-N` ids that do not collide with the current scene.
#[derive(Clone, Debug)]
pub struct IdGen {
    next: u64,
}

impl Default for IdGen {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGen {
    pub fn allocate(&mut self, kind: IdKind, scene: &Scene) -> String {
        let groups = if kind == IdKind::Group {
            scene.group_ids()
        } else {
            Vec::new()
        };
        loop {
            let id = format!("{}-{}", kind.prefix(), self.next);
            self.next += 1;
            if !scene.contains_id(&id) && !groups.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Shape};

    fn scene_with(ids: &[&str]) -> Scene {
        let mut scene = Scene::default();
        for (i, id) in ids.iter().enumerate() {
            scene.add_node(Node::shape(*id, Shape::Rect, egui::pos2(i as f32 * 10.0, 0.0)));
        }
        scene
    }

    fn order(scene: &Scene) -> Vec<&str> {
        scene.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn layer_operations_only_reorder() {
        let mut scene = scene_with(&["a", "b", "c"]);
        assert!(scene.bring_to_front("a"));
        assert_eq!(order(&scene), ["b", "c", "a"]);
        assert!(scene.send_to_back("a"));
        assert_eq!(order(&scene), ["a", "b", "c"]);
        assert!(scene.move_layer_up("a"));
        assert_eq!(order(&scene), ["b", "a", "c"]);
        assert!(scene.move_layer_down("c"));
        assert_eq!(order(&scene), ["b", "c", "a"]);
        assert!(!scene.move_layer_up("a"));
        assert!(!scene.move_layer_down("b"));
    }

    #[test]
    fn grouping_needs_two_nodes() {
        let mut scene = scene_with(&["a", "b"]);
        let one: HashSet<String> = ["a".to_string()].into();
        assert!(!scene.group_nodes(&one, "g".into()));
        let both: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        assert!(scene.group_nodes(&both, "g".into()));
        assert_eq!(scene.group_members("g").len(), 2);
        assert_eq!(scene.expand_to_groups(&one), both);
        assert!(scene.ungroup_nodes(&both));
        assert!(scene.group_members("g").is_empty());
    }

    #[test]
    fn locked_member_pins_its_group() {
        let mut scene = scene_with(&["a", "b", "c"]);
        let ab: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        scene.group_nodes(&ab, "g".into());
        scene.update_node("b", |n| n.locked = true);

        let all: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let ids: Vec<String> = scene.drag_origins(&all).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["c"]);
    }

    #[test]
    fn removing_a_node_leaves_its_connections() {
        let mut scene = scene_with(&["a", "b"]);
        scene.add_connection(Connection::new("c1", "a", "b"));
        scene.remove_node("b");
        assert_eq!(scene.connections.len(), 1);
        assert_eq!(scene.dangling_connections().len(), 1);
        assert_eq!(scene.prune_dangling_connections(), 1);
        assert!(scene.connections.is_empty());
    }

    #[test]
    fn id_gen_skips_existing_ids() {
        let scene = scene_with(&["node-1", "node-2"]);
        let mut ids = IdGen::default();
        assert_eq!(ids.allocate(IdKind::Node, &scene), "node-3");
        assert_eq!(ids.allocate(IdKind::Connection, &scene), "conn-4");
    }
}
