use eframe::egui::{self, Pos2, Vec2};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

use super::{Editor, Response, Selection};
use crate::export::{self, ExportFormat};
use crate::model::{Connection, Node, NodeKind};
use crate::notify::Notifier;
use crate::scene::{IdKind, Scene};
use crate::store::{SavedScene, SceneStore};
use crate::templates::{self, DiagramType};

const DUPLICATE_OFFSET: f32 = 20.0;

impl Editor {
    pub fn add_node(&mut self, kind: NodeKind, center: Pos2) -> String {
        let id = self.ids.allocate(IdKind::Node, &self.scene);
        debug!(%id, kind = kind.type_name(), "node added");
        self.scene.add_node(Node::new(id.clone(), kind, center));
        self.selection = Selection::from_nodes([id.clone()]);
        self.commit("add node");
        id
    }

    fn selected_with_groups(&self) -> HashSet<String> {
        self.scene.expand_to_groups(&self.selection.node_ids())
    }

    /// Removes the selected connection, or every selected unlocked node.
    /// Connections attached to removed nodes stay in the scene.
    pub fn delete_selection(&mut self) -> bool {
        match std::mem::take(&mut self.selection) {
            Selection::None => false,
            Selection::Connection(id) => {
                if self.scene.remove_connection(&id).is_none() {
                    return false;
                }
                self.commit("delete connection");
                true
            }
            Selection::Nodes(ids) => {
                let ids = self.scene.expand_to_groups(&ids);
                let (locked, removable): (Vec<String>, Vec<String>) = ids
                    .into_iter()
                    .partition(|id| self.scene.node(id).is_some_and(|n| n.locked));
                self.selection = Selection::from_nodes(locked);
                let mut removed = 0;
                for id in &removable {
                    if self.scene.remove_node(id).is_some() {
                        removed += 1;
                    }
                }
                if removed == 0 {
                    return false;
                }
                debug!(removed, "nodes deleted");
                self.commit("delete nodes");
                true
            }
        }
    }

    /// Applies `f` to every selected node (and group member); one commit if
    /// anything changed.
    pub fn update_selected_nodes(&mut self, mut f: impl FnMut(&mut Node)) -> bool {
        let ids = self.selected_with_groups();
        let mut changed = false;
        for node in self.scene.nodes.iter_mut().filter(|n| ids.contains(&n.id)) {
            let before = node.clone();
            f(node);
            changed |= *node != before;
        }
        if changed {
            self.commit("restyle nodes");
        }
        changed
    }

    pub fn update_selected_connection(&mut self, f: impl FnOnce(&mut Connection)) -> bool {
        let Some(id) = self.selection.connection().map(str::to_string) else {
            return false;
        };
        let Some(before) = self.scene.connection(&id).cloned() else {
            return false;
        };
        self.scene.update_connection(&id, f);
        if self.scene.connection(&id) == Some(&before) {
            return false;
        }
        self.commit("restyle connection");
        true
    }

    pub fn set_node_text(&mut self, id: &str, text: String) -> bool {
        match self.scene.node(id) {
            Some(node) if node.text != text => {}
            _ => return false,
        }
        self.scene.update_node(id, |n| n.text = text);
        self.commit("edit text");
        true
    }

    pub fn set_locked(&mut self, locked: bool) -> bool {
        self.update_selected_nodes(|n| n.locked = locked)
    }

    pub fn hide_selection(&mut self) -> bool {
        let changed = self.update_selected_nodes(|n| n.hidden = true);
        if changed {
            self.selection = Selection::None;
        }
        changed
    }

    pub fn show_all(&mut self) -> bool {
        let mut changed = false;
        for node in self.scene.nodes.iter_mut().filter(|n| n.hidden) {
            node.hidden = false;
            changed = true;
        }
        if changed {
            self.commit("show hidden nodes");
        }
        changed
    }

    pub fn select_all(&mut self) -> Response {
        self.selection = Selection::from_nodes(
            self.scene
                .nodes
                .iter()
                .filter(|n| !n.hidden)
                .map(|n| n.id.clone()),
        );
        Response::Changed
    }

    pub fn group_selection(&mut self) -> bool {
        let ids = self.selected_with_groups();
        if ids.len() < 2 {
            return false;
        }
        let group_id = self.ids.allocate(IdKind::Group, &self.scene);
        if !self.scene.group_nodes(&ids, group_id.clone()) {
            return false;
        }
        debug!(%group_id, members = ids.len(), "grouped");
        self.commit("group");
        true
    }

    pub fn ungroup_selection(&mut self) -> bool {
        let ids = self.selected_with_groups();
        if !self.scene.ungroup_nodes(&ids) {
            return false;
        }
        self.commit("ungroup");
        true
    }

    fn selected_in_order(&self) -> Vec<String> {
        let ids = self.selected_with_groups();
        self.scene
            .nodes
            .iter()
            .filter(|n| ids.contains(&n.id))
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn bring_to_front(&mut self) -> bool {
        let mut changed = false;
        for id in self.selected_in_order() {
            changed |= self.scene.bring_to_front(&id);
        }
        if changed {
            self.commit("bring to front");
        }
        changed
    }

    pub fn send_to_back(&mut self) -> bool {
        let mut changed = false;
        for id in self.selected_in_order().iter().rev() {
            changed |= self.scene.send_to_back(id);
        }
        if changed {
            self.commit("send to back");
        }
        changed
    }

    /// Swaps each selected node with the unselected node just above it.
    pub fn layer_up(&mut self) -> bool {
        let ids = self.selected_with_groups();
        let nodes = &mut self.scene.nodes;
        let mut changed = false;
        for idx in (0..nodes.len().saturating_sub(1)).rev() {
            if ids.contains(&nodes[idx].id) && !ids.contains(&nodes[idx + 1].id) {
                nodes.swap(idx, idx + 1);
                changed = true;
            }
        }
        if changed {
            self.commit("layer up");
        }
        changed
    }

    pub fn layer_down(&mut self) -> bool {
        let ids = self.selected_with_groups();
        let nodes = &mut self.scene.nodes;
        let mut changed = false;
        for idx in 1..nodes.len() {
            if ids.contains(&nodes[idx].id) && !ids.contains(&nodes[idx - 1].id) {
                nodes.swap(idx, idx - 1);
                changed = true;
            }
        }
        if changed {
            self.commit("layer down");
        }
        changed
    }

    pub fn nudge_selection(&mut self, delta: Vec2) -> bool {
        let ids = self.selected_with_groups();
        let origins = self.scene.drag_origins(&ids);
        if origins.is_empty() || delta == Vec2::ZERO {
            return false;
        }
        self.scene.translate_nodes(&origins, delta);
        self.commit("nudge");
        true
    }

    /// Copies the selection with fresh node and group ids, plus the
    /// connections running between copied nodes. The copies become the
    /// selection.
    pub fn duplicate_selection(&mut self) -> bool {
        let originals: Vec<Node> = {
            let ids = self.selected_with_groups();
            self.scene
                .nodes
                .iter()
                .filter(|n| ids.contains(&n.id))
                .cloned()
                .collect()
        };
        if originals.is_empty() {
            return false;
        }
        let offset = egui::vec2(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        let mut id_map: HashMap<String, String> = HashMap::new();
        let mut group_map: HashMap<String, String> = HashMap::new();
        for mut node in originals {
            let new_id = self.ids.allocate(IdKind::Node, &self.scene);
            id_map.insert(node.id.clone(), new_id.clone());
            node.id = new_id;
            node.set_center(node.center() + offset);
            node.locked = false;
            if let Some(group) = node.group_id.take() {
                let ids = &mut self.ids;
                let scene = &self.scene;
                let new_group = group_map
                    .entry(group)
                    .or_insert_with(|| ids.allocate(IdKind::Group, scene))
                    .clone();
                node.group_id = Some(new_group);
            }
            self.scene.add_node(node);
        }
        let copies: Vec<Connection> = self
            .scene
            .connections
            .iter()
            .filter_map(|c| {
                let from = id_map.get(&c.from)?;
                let to = id_map.get(&c.to)?;
                let mut copy = c.clone();
                copy.from = from.clone();
                copy.to = to.clone();
                Some(copy)
            })
            .collect();
        for mut connection in copies {
            connection.id = self.ids.allocate(IdKind::Connection, &self.scene);
            self.scene.add_connection(connection);
        }
        debug!(count = id_map.len(), "duplicated");
        self.selection = Selection::from_nodes(id_map.into_values());
        self.commit("duplicate");
        true
    }

    /// Drops connections whose endpoints are gone; commits if any were.
    pub fn prune_dangling_connections(&mut self) -> usize {
        let removed = self.scene.prune_dangling_connections();
        if removed > 0 {
            self.sync_selection();
            info!(removed, "pruned dangling connections");
            self.commit("prune connections");
        }
        removed
    }

    pub fn replace_scene(&mut self, scene: Scene) {
        self.text_edit = None;
        self.gesture = None;
        self.selection = Selection::None;
        self.scene = scene;
        self.commit("replace scene");
    }

    pub fn switch_diagram_type(&mut self, diagram_type: DiagramType) {
        info!(diagram_type = diagram_type.name(), "switching diagram type");
        self.replace_scene(templates::template(diagram_type));
        self.diagram_type = diagram_type;
        self.notices.info(format!("Switched to {}", diagram_type.name()));
    }

    pub fn to_saved(&self) -> SavedScene {
        SavedScene::new(self.name.clone(), self.diagram_type, self.scene.clone())
    }

    pub fn load_saved(&mut self, saved: SavedScene) {
        self.name = saved.name;
        self.diagram_type = saved.diagram_type;
        self.replace_scene(saved.scene);
        let dangling = self.scene.dangling_connections().len();
        if dangling > 0 {
            warn!(dangling, "loaded diagram has dangling connections");
        }
    }

    pub fn save(&mut self, store: &dyn SceneStore, prune_dangling: bool) -> bool {
        if prune_dangling {
            self.prune_dangling_connections();
        }
        match store.save(&self.to_saved()) {
            Ok(()) => {
                self.notices.success(format!("Saved \"{}\"", self.name));
                true
            }
            Err(e) => {
                warn!(error = %e, name = %self.name, "save failed");
                self.notices.error(format!("Could not save \"{}\": {e}", self.name));
                false
            }
        }
    }

    pub fn load(&mut self, store: &dyn SceneStore, name: &str) -> bool {
        match store.load(name) {
            Ok(saved) => {
                self.load_saved(saved);
                self.notices.success(format!("Opened \"{name}\""));
                true
            }
            Err(e) => {
                warn!(error = %e, name, "load failed");
                self.notices.error(format!("Could not open \"{name}\": {e}"));
                false
            }
        }
    }

    /// Exports the scene to `path`, reporting the outcome as a notice. A
    /// failed rasterization still succeeds with an SVG and a warning.
    pub fn export_image(&mut self, path: &Path, scale: f32) -> bool {
        match export::export_image(&self.to_svg(), path, scale) {
            Ok(outcome) => {
                match (&outcome.fallback_reason, outcome.format) {
                    (Some(reason), _) => self.notices.warning(format!(
                        "PNG export failed ({reason}); saved SVG to {}",
                        outcome.path.display()
                    )),
                    (None, ExportFormat::Png) => self
                        .notices
                        .success(format!("Exported PNG to {}", outcome.path.display())),
                    (None, ExportFormat::Svg) => self
                        .notices
                        .success(format!("Exported SVG to {}", outcome.path.display())),
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.notices.error(format!("Export failed: {e}"));
                false
            }
        }
    }
}
