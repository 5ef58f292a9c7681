use eframe::egui::{self, Pos2, Rect, Vec2};
use std::collections::HashSet;
use tracing::debug;

mod actions;
mod input;
mod keyboard;
mod pointer;

pub use input::{InputEvent, Key, Modifiers};

use crate::geometry::{self, Corner};
use crate::history::History;
use crate::model::{ConnectionStyle, PenStyle, Shape};
use crate::notify::{Notice, NoticeQueue};
use crate::render::{self, Draft, RenderInput};
use crate::scene::{IdGen, Scene};
use crate::settings::EditorSettings;
use crate::svg;
use crate::templates::DiagramType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    AddText,
    AddSticker,
    AddZone,
    AddShape(Shape),
    DrawConnection,
    DrawFreehand,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::AddText => "Text",
            Tool::AddSticker => "Sticker",
            Tool::AddZone => "Zone",
            Tool::AddShape(shape) => shape.name(),
            Tool::DrawConnection => "Connect",
            Tool::DrawFreehand => "Pen",
        }
    }
}

/// Either a set of nodes or one connection, never both.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Nodes(HashSet<String>),
    Connection(String),
}

impl Selection {
    pub fn from_nodes(ids: impl IntoIterator<Item = String>) -> Self {
        let ids: HashSet<String> = ids.into_iter().collect();
        if ids.is_empty() {
            Selection::None
        } else {
            Selection::Nodes(ids)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        matches!(self, Selection::Nodes(ids) if ids.contains(id))
    }

    pub fn node_ids(&self) -> HashSet<String> {
        match self {
            Selection::Nodes(ids) => ids.clone(),
            _ => HashSet::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Selection::Nodes(ids) => ids.len(),
            _ => 0,
        }
    }

    pub fn single_node(&self) -> Option<&str> {
        match self {
            Selection::Nodes(ids) if ids.len() == 1 => ids.iter().next().map(String::as_str),
            _ => None,
        }
    }

    pub fn connection(&self) -> Option<&str> {
        match self {
            Selection::Connection(id) => Some(id),
            _ => None,
        }
    }
}

/// Screen = pan + world * zoom, in canvas-local pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl View {
    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        (self.pan + world.to_vec2() * self.zoom).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.pan) / self.zoom).to_pos2()
    }

    pub fn world_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.world_to_screen(rect.min), self.world_to_screen(rect.max))
    }

    /// Scales by `zoom_delta` keeping the world point under `screen_point` fixed.
    pub fn zoom_about_screen_point(&mut self, screen_point: Pos2, zoom_delta: f32, min: f32, max: f32) {
        let before = self.screen_to_world(screen_point);
        self.zoom = (self.zoom * zoom_delta).clamp(min, max);
        let after_screen = self.world_to_screen(before);
        self.pan += screen_point - after_screen;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Grab,
    Grabbing,
    Crosshair,
    Move,
    ResizeNwSe,
    ResizeNeSw,
    Text,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Response {
    #[default]
    Ignored,
    /// Transient state changed (selection, view, gesture); nothing to undo.
    Changed,
    /// A new history entry was recorded.
    Committed,
}

impl Response {
    fn committed_if(changed: bool) -> Self {
        if changed {
            Response::Committed
        } else {
            Response::Ignored
        }
    }

    fn changed_if(changed: bool) -> Self {
        if changed {
            Response::Changed
        } else {
            Response::Ignored
        }
    }

    pub fn needs_repaint(self) -> bool {
        self != Response::Ignored
    }
}

#[derive(Clone, Debug)]
enum Gesture {
    Pan {
        last: Pos2,
    },
    DragNodes {
        start: Pos2,
        origins: Vec<(String, Pos2)>,
        clicked: String,
        moved: bool,
        additive: bool,
    },
    Resize {
        node_id: String,
        corner: Corner,
        anchor: Pos2,
        start: Rect,
    },
    SelectBox {
        start: Pos2,
        current: Pos2,
        base: HashSet<String>,
    },
    Lasso {
        points: Vec<Pos2>,
        base: HashSet<String>,
    },
    Connect {
        from: String,
        current: Pos2,
    },
    Stroke {
        points: Vec<Pos2>,
    },
}

/// Inline text editing of one node; `original` decides whether blur commits.
#[derive(Clone, Debug, PartialEq)]
pub struct TextEdit {
    pub node_id: String,
    pub original: String,
    pub buffer: String,
}

pub struct Editor {
    scene: Scene,
    history: History<Scene>,
    selection: Selection,
    tool: Tool,
    previous_tool: Tool,
    space_held: bool,
    view: View,
    gesture: Option<Gesture>,
    text_edit: Option<TextEdit>,
    hover: Option<Pos2>,
    ids: IdGen,
    settings: EditorSettings,
    diagram_type: DiagramType,
    name: String,
    connection_style: ConnectionStyle,
    pen: PenStyle,
    notices: NoticeQueue,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_scene(Scene::default(), settings)
    }

    pub fn with_scene(scene: Scene, settings: EditorSettings) -> Self {
        Self {
            history: History::with_limit(scene.clone(), settings.history_limit),
            scene,
            selection: Selection::None,
            tool: Tool::Select,
            previous_tool: Tool::Select,
            space_held: false,
            view: View::default(),
            gesture: None,
            text_edit: None,
            hover: None,
            ids: IdGen::default(),
            pen: settings.pen.clone(),
            settings,
            diagram_type: DiagramType::Freeform,
            name: "Untitled".to_string(),
            connection_style: ConnectionStyle::default(),
            notices: NoticeQueue::default(),
        }
    }

    pub fn handle(&mut self, event: InputEvent) -> Response {
        match event {
            InputEvent::PointerDown { pos, modifiers } => self.pointer_down(pos, modifiers),
            InputEvent::PointerMove { pos, .. } => self.pointer_move(pos),
            InputEvent::PointerUp { pos, .. } => self.pointer_up(pos),
            InputEvent::DoubleClick { pos } => self.double_click(pos),
            InputEvent::Wheel { pos, delta } => self.wheel(pos, delta),
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, modifiers),
            InputEvent::KeyUp { key } => self.key_up(key),
            InputEvent::Text(text) => self.type_text(&text),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History<Scene> {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.text_edit.as_ref()
    }

    pub fn is_space_held(&self) -> bool {
        self.space_held
    }

    pub fn is_busy(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn connection_style(&self) -> &ConnectionStyle {
        &self.connection_style
    }

    pub fn set_connection_style(&mut self, style: ConnectionStyle) {
        self.connection_style = style;
    }

    pub fn pen(&self) -> &PenStyle {
        &self.pen
    }

    pub fn set_pen(&mut self, pen: PenStyle) {
        self.pen = pen;
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain().collect()
    }

    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.history.set_limit(settings.history_limit);
        self.view.zoom = self.view.zoom.clamp(settings.zoom_min, settings.zoom_max);
        self.settings = settings;
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.text_edit.is_some() {
            self.blur();
        }
        self.cancel_gesture();
        if tool == Tool::DrawFreehand && self.tool != Tool::DrawFreehand {
            self.previous_tool = self.tool;
        }
        debug!(tool = tool.name(), "tool changed");
        self.tool = tool;
    }

    pub fn set_view(&mut self, view: View) {
        self.view = View {
            pan: view.pan,
            zoom: view.zoom.clamp(self.settings.zoom_min, self.settings.zoom_max),
        };
    }

    pub fn zoom_by(&mut self, factor: f32, about: Pos2) {
        let (min, max) = (self.settings.zoom_min, self.settings.zoom_max);
        self.view.zoom_about_screen_point(about, factor, min, max);
    }

    pub fn reset_view(&mut self) {
        self.view = View::default();
    }

    /// Pans and zooms so every visible node fits inside `viewport`.
    pub fn zoom_to_fit(&mut self, viewport: Vec2) {
        let Some(bounds) = geometry::bounds_of(self.scene.nodes.iter().filter(|n| !n.hidden)) else {
            self.reset_view();
            return;
        };
        let bounds = bounds.expand(40.0);
        let zoom = (viewport.x / bounds.width())
            .min(viewport.y / bounds.height())
            .clamp(self.settings.zoom_min, self.settings.zoom_max.min(1.0));
        self.view = View {
            pan: viewport * 0.5 - bounds.center().to_vec2() * zoom,
            zoom,
        };
    }

    fn world_px(&self, px: f32) -> f32 {
        px / self.view.zoom
    }

    fn commit(&mut self, label: &str) {
        self.history.commit(self.scene.clone());
        debug!(label, index = self.history.index(), len = self.history.len(), "commit");
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.blur();
        self.gesture = None;
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.scene = snapshot.clone();
        self.sync_selection();
        debug!(index = self.history.index(), "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        self.blur();
        self.gesture = None;
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.scene = snapshot.clone();
        self.sync_selection();
        debug!(index = self.history.index(), "redo");
        true
    }

    /// Drops selected ids that no longer exist or are hidden.
    fn sync_selection(&mut self) {
        self.selection = match std::mem::take(&mut self.selection) {
            Selection::Nodes(ids) => Selection::from_nodes(
                ids.into_iter()
                    .filter(|id| self.scene.node(id).is_some_and(|n| !n.hidden)),
            ),
            Selection::Connection(id) if self.scene.connection(&id).is_some() => {
                Selection::Connection(id)
            }
            _ => Selection::None,
        };
    }

    /// Abandons the current gesture, putting back anything it moved.
    fn cancel_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        if matches!(
            gesture,
            Gesture::DragNodes { moved: true, .. } | Gesture::Resize { .. }
        ) {
            self.scene = self.history.current().clone();
        }
        true
    }

    fn resize_target(&self) -> Option<(&str, Rect)> {
        let id = self.selection.single_node()?;
        let node = self.scene.node(id).filter(|n| n.is_movable())?;
        Some((id, geometry::node_rect(node)))
    }

    fn handle_hit(&self, world: Pos2) -> Option<(String, Corner, Rect)> {
        let (id, rect) = self.resize_target()?;
        let corner = geometry::corner_handle_at(rect, world, self.world_px(self.settings.handle_size))?;
        Some((id.to_string(), corner, rect))
    }

    pub fn cursor(&self) -> Cursor {
        match &self.gesture {
            Some(Gesture::Pan { .. }) => return Cursor::Grabbing,
            Some(Gesture::DragNodes { moved: true, .. }) => return Cursor::Grabbing,
            Some(Gesture::Resize { corner, .. }) => return resize_cursor(*corner),
            Some(Gesture::Connect { .. } | Gesture::Stroke { .. }) => return Cursor::Crosshair,
            _ => {}
        }
        if self.space_held {
            return Cursor::Grab;
        }
        match self.tool {
            Tool::Select => {
                let Some(p) = self.hover else {
                    return Cursor::Default;
                };
                if let Some((_, corner, _)) = self.handle_hit(p) {
                    return resize_cursor(corner);
                }
                let tol = self.world_px(self.settings.hit_tolerance);
                match geometry::topmost_node_at(&self.scene, p, tol) {
                    Some(node) if self.text_edit.as_ref().is_some_and(|e| e.node_id == node.id) => {
                        Cursor::Text
                    }
                    Some(node) if node.is_movable() => Cursor::Move,
                    _ => Cursor::Default,
                }
            }
            Tool::AddText => Cursor::Text,
            _ => Cursor::Crosshair,
        }
    }

    fn draft(&self) -> Option<Draft> {
        match self.gesture.as_ref()? {
            Gesture::Connect { from, current } => {
                let source = self.scene.node(from)?;
                Some(Draft::Connection {
                    from: geometry::edge_intersection(source, *current),
                    to: *current,
                })
            }
            Gesture::Stroke { points } => Some(Draft::Stroke {
                points: points.clone(),
                pen: self.pen.clone(),
            }),
            Gesture::SelectBox { start, current, .. } => {
                Some(Draft::SelectBox(Rect::from_two_pos(*start, *current)))
            }
            Gesture::Lasso { points, .. } => Some(Draft::Lasso(points.clone())),
            _ => None,
        }
    }

    pub fn render_input(&self) -> RenderInput<'_> {
        RenderInput {
            scene: &self.scene,
            diagram_type: self.diagram_type,
            selection: Some(&self.selection),
            handles: self.resize_target().map(|(_, rect)| rect),
            handle_size: self.world_px(self.settings.handle_size),
            draft: self.draft(),
            text_edit: self.text_edit.as_ref(),
        }
    }

    /// The scene as a standalone SVG document, without selection or drafts.
    pub fn to_svg(&self) -> String {
        let list = render::build_display_list(&RenderInput::export(&self.scene, self.diagram_type));
        svg::to_svg(&list)
    }
}

fn resize_cursor(corner: Corner) -> Cursor {
    match corner {
        Corner::NW | Corner::SE => Cursor::ResizeNwSe,
        Corner::NE | Corner::SW => Cursor::ResizeNeSw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_round_trips_points() {
        let view = View {
            pan: egui::vec2(30.0, -12.0),
            zoom: 1.5,
        };
        let world = egui::pos2(10.0, 20.0);
        let back = view.screen_to_world(view.world_to_screen(world));
        assert!((back - world).length() < 1e-4);
    }

    #[test]
    fn zoom_keeps_point_under_cursor() {
        let mut view = View::default();
        let cursor = egui::pos2(200.0, 100.0);
        let world = view.screen_to_world(cursor);
        view.zoom_about_screen_point(cursor, 1.25, 0.1, 3.0);
        assert!((view.world_to_screen(world) - cursor).length() < 1e-3);
    }

    #[test]
    fn selection_is_nodes_or_connection() {
        let sel = Selection::from_nodes(["a".to_string()]);
        assert_eq!(sel.single_node(), Some("a"));
        assert_eq!(sel.connection(), None);
        let sel = Selection::Connection("c".into());
        assert!(!sel.contains_node("c"));
        assert!(Selection::from_nodes(Vec::<String>::new()).is_empty());
    }
}
