//! Scene to display list. Everything here is in world coordinates and free
//! of egui painting, so the same list feeds the canvas and SVG export.

use eframe::egui::{self, Pos2, Rect};

use crate::editor::{Selection, TextEdit};
use crate::geometry::{self, Corner, PathData};
use crate::model::{
    FontFamily, FontStyle, FontWeight, FreehandPath, LineStyle, Marker, Node, NodeKind, PenStyle,
    Rgba, TextAlign, TextDecoration,
};
use crate::scene::Scene;
use crate::templates::{self, DiagramType, Guide};

pub const SELECTION_COLOR: Rgba = Rgba::rgb(59, 130, 246);
const GROUP_OUTLINE_COLOR: Rgba = Rgba::rgb(148, 163, 184);
const GUIDE_COLOR: Rgba = Rgba::rgb(203, 213, 225);
/// Extra width of the invisible stroke that makes thin connections easy to hit.
pub const CONNECTION_HIT_WIDTH: f32 = 12.0;
const GROUP_PADDING: f32 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Guides,
    Zones,
    Connections,
    Nodes,
    Paths,
    Groups,
    Handles,
    Drafts,
    Caret,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
    pub dash: LineStyle,
    pub animated: bool,
}

impl Stroke {
    pub fn solid(color: Rgba, width: f32) -> Self {
        Self {
            color,
            width,
            dash: LineStyle::Solid,
            animated: false,
        }
    }

    pub fn dashed(color: Rgba, width: f32) -> Self {
        Self {
            dash: LineStyle::Dashed,
            ..Self::solid(color, width)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub rect: Rect,
    pub text: String,
    pub color: Rgba,
    pub size: f32,
    pub family: FontFamily,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub decoration: TextDecoration,
    pub align: TextAlign,
}

impl TextBlock {
    pub fn line_height(&self) -> f32 {
        self.size * 1.25
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Path {
        path: PathData,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
        start_marker: Marker,
        end_marker: Marker,
        opacity: f32,
    },
    /// Transparent wide stroke used only for pointer hits on connections.
    HitArea {
        path: PathData,
        width: f32,
        connection_id: String,
    },
    Text(TextBlock),
    /// `href` is a data URL or a file path.
    Image { rect: Rect, href: String },
}

impl Primitive {
    fn shape(path: PathData, fill: Option<Rgba>, stroke: Option<Stroke>) -> Self {
        Primitive::Path {
            path,
            fill,
            stroke,
            start_marker: Marker::None,
            end_marker: Marker::None,
            opacity: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub layer: Layer,
    pub owner: Option<String>,
    pub primitive: Primitive,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    pub items: Vec<Item>,
}

impl DisplayList {
    fn push(&mut self, layer: Layer, owner: Option<&str>, primitive: Primitive) {
        self.items.push(Item {
            layer,
            owner: owner.map(str::to_string),
            primitive,
        });
    }

    pub fn in_layer(&self, layer: Layer) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |i| i.layer == layer)
    }

    /// Union of everything visible, including stroke widths.
    pub fn bounds(&self) -> Option<Rect> {
        self.items
            .iter()
            .filter_map(|item| match &item.primitive {
                Primitive::Path { path, stroke, .. } => path
                    .bounds()
                    .map(|b| b.expand(stroke.as_ref().map_or(0.0, |s| s.width * 0.5))),
                Primitive::Text(text) => Some(text.rect),
                Primitive::Image { rect, .. } => Some(*rect),
                Primitive::HitArea { .. } => None,
            })
            .reduce(|a, b| a.union(b))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Draft {
    Connection { from: Pos2, to: Pos2 },
    Stroke { points: Vec<Pos2>, pen: PenStyle },
    SelectBox(Rect),
    Lasso(Vec<Pos2>),
}

pub struct RenderInput<'a> {
    pub scene: &'a Scene,
    pub diagram_type: DiagramType,
    pub selection: Option<&'a Selection>,
    pub handles: Option<Rect>,
    pub handle_size: f32,
    pub draft: Option<Draft>,
    pub text_edit: Option<&'a TextEdit>,
}

impl<'a> RenderInput<'a> {
    /// Scene only: no selection, handles, drafts or caret.
    pub fn export(scene: &'a Scene, diagram_type: DiagramType) -> Self {
        Self {
            scene,
            diagram_type,
            selection: None,
            handles: None,
            handle_size: 0.0,
            draft: None,
            text_edit: None,
        }
    }

    fn node_selected(&self, id: &str) -> bool {
        self.selection.is_some_and(|s| s.contains_node(id))
    }

    fn connection_selected(&self, id: &str) -> bool {
        self.selection.and_then(Selection::connection) == Some(id)
    }
}

pub fn build_display_list(input: &RenderInput<'_>) -> DisplayList {
    let mut list = DisplayList::default();
    let scene = input.scene;

    for guide in templates::background_guides(input.diagram_type) {
        push_guide(&mut list, &guide);
    }

    for node in scene.nodes.iter().filter(|n| !n.hidden && n.kind.is_zone()) {
        push_node(&mut list, input, node, Layer::Zones);
    }

    for connection in &scene.connections {
        let Some(path) = geometry::connection_geometry(scene, connection) else {
            continue;
        };
        let style = &connection.style;
        list.push(
            Layer::Connections,
            Some(&connection.id),
            Primitive::HitArea {
                path: path.clone(),
                width: style.thickness + CONNECTION_HIT_WIDTH,
                connection_id: connection.id.clone(),
            },
        );
        let stroke = if input.connection_selected(&connection.id) {
            Stroke {
                color: SELECTION_COLOR,
                width: style.thickness + 1.0,
                dash: style.dash,
                animated: style.animated,
            }
        } else {
            Stroke {
                color: style.color,
                width: style.thickness,
                dash: style.dash,
                animated: style.animated,
            }
        };
        list.push(
            Layer::Connections,
            Some(&connection.id),
            Primitive::Path {
                path,
                fill: None,
                stroke: Some(stroke),
                start_marker: style.start_marker,
                end_marker: style.end_marker,
                opacity: 1.0,
            },
        );
    }

    for node in scene.nodes.iter().filter(|n| !n.hidden && !n.kind.is_zone()) {
        push_node(&mut list, input, node, Layer::Nodes);
    }

    for path in &scene.paths {
        push_freehand(&mut list, path);
    }

    for group_id in scene.group_ids() {
        let members = scene.group_members(&group_id).into_iter().filter(|n| {
            !n.hidden
                && !matches!(
                    n.kind,
                    NodeKind::Label | NodeKind::Sticker { .. } | NodeKind::Zone
                )
        });
        if let Some(bounds) = geometry::bounds_of(members) {
            list.push(
                Layer::Groups,
                Some(&group_id),
                Primitive::shape(
                    PathData::rect(bounds.expand(GROUP_PADDING)),
                    None,
                    Some(Stroke::dashed(GROUP_OUTLINE_COLOR, 1.0)),
                ),
            );
        }
    }

    if let Some(rect) = input.handles {
        for corner in Corner::ALL {
            list.push(
                Layer::Handles,
                None,
                Primitive::shape(
                    PathData::rect(geometry::handle_rect(rect, corner, input.handle_size)),
                    Some(Rgba::WHITE),
                    Some(Stroke::solid(SELECTION_COLOR, input.handle_size * 0.15)),
                ),
            );
        }
    }

    if let Some(draft) = &input.draft {
        push_draft(&mut list, draft, input.handle_size);
    }

    if let Some(edit) = input.text_edit {
        if let Some(node) = scene.node(&edit.node_id) {
            push_caret(&mut list, node, &edit.buffer);
        }
    }

    list
}

fn push_guide(list: &mut DisplayList, guide: &Guide) {
    match guide {
        Guide::Line { from, to } => list.push(
            Layer::Guides,
            None,
            Primitive::shape(
                PathData::new().move_to(*from).line_to(*to),
                None,
                Some(Stroke::dashed(GUIDE_COLOR, 2.0)),
            ),
        ),
        Guide::Grid { area, spacing } => {
            let mut path = PathData::new();
            let mut x = area.min.x;
            while x <= area.max.x {
                path = path
                    .move_to(egui::pos2(x, area.min.y))
                    .line_to(egui::pos2(x, area.max.y));
                x += spacing;
            }
            let mut y = area.min.y;
            while y <= area.max.y {
                path = path
                    .move_to(egui::pos2(area.min.x, y))
                    .line_to(egui::pos2(area.max.x, y));
                y += spacing;
            }
            list.push(
                Layer::Guides,
                None,
                Primitive::shape(path, None, Some(Stroke::solid(GUIDE_COLOR, 1.0))),
            );
        }
    }
}

fn push_node(list: &mut DisplayList, input: &RenderInput<'_>, node: &Node, layer: Layer) {
    let style = &node.style;
    let selected = input.node_selected(&node.id);
    let border = style.border_style.line_style().map(|dash| Stroke {
        color: style.border_color,
        width: style.border_width,
        dash,
        animated: false,
    });
    let stroke = if selected {
        Some(Stroke::solid(
            SELECTION_COLOR,
            border.as_ref().map_or(1.0, |b| b.width.max(1.0)) + 1.5,
        ))
    } else {
        border
    };
    let outline = geometry::node_outline(node);
    let has_body = style.fill.is_some() || stroke.is_some();
    if has_body {
        list.push(layer, Some(&node.id), Primitive::shape(outline, style.fill, stroke));
    }

    if let NodeKind::Sticker {
        background_image: Some(href),
    } = &node.kind
    {
        list.push(
            layer,
            Some(&node.id),
            Primitive::Image {
                rect: geometry::node_rect(node),
                href: href.clone(),
            },
        );
    }

    let editing = input.text_edit.filter(|e| e.node_id == node.id);
    let text = editing.map_or(node.text.as_str(), |e| e.buffer.as_str());
    if !text.is_empty() || editing.is_some() {
        list.push(layer, Some(&node.id), Primitive::Text(text_block(node, text)));
    }
}

pub fn text_block(node: &Node, text: &str) -> TextBlock {
    let style = &node.style;
    let size = match node.kind {
        NodeKind::Sticker { .. } => {
            let dims = geometry::node_dimensions(node);
            let default = geometry::strategy_for(&node.kind).default_size;
            style.font_size * (dims.min_elem() / default.min_elem()).max(0.25)
        }
        _ => style.font_size,
    };
    TextBlock {
        rect: geometry::text_rect(node),
        text: text.to_string(),
        color: style.text_color,
        size,
        family: style.font_family,
        weight: style.font_weight,
        style: style.font_style,
        decoration: style.text_decoration,
        align: style.text_align,
    }
}

fn push_freehand(list: &mut DisplayList, path: &FreehandPath) {
    let points: Vec<Pos2> = path.points().collect();
    if points.len() < 2 {
        return;
    }
    list.push(
        Layer::Paths,
        Some(&path.id),
        Primitive::Path {
            path: PathData::polyline(points),
            fill: None,
            stroke: Some(Stroke::solid(path.color, path.thickness)),
            start_marker: Marker::None,
            end_marker: Marker::None,
            opacity: path.opacity,
        },
    );
}

fn push_draft(list: &mut DisplayList, draft: &Draft, hairline: f32) {
    let width = (hairline * 0.15).max(1.0);
    let primitive = match draft {
        Draft::Connection { from, to } => Primitive::Path {
            path: PathData::new().move_to(*from).line_to(*to),
            fill: None,
            stroke: Some(Stroke::dashed(SELECTION_COLOR, 2.0)),
            start_marker: Marker::None,
            end_marker: Marker::Arrow,
            opacity: 1.0,
        },
        Draft::Stroke { points, pen } => {
            if points.len() < 2 {
                return;
            }
            Primitive::Path {
                path: PathData::polyline(points.iter().copied()),
                fill: None,
                stroke: Some(Stroke::solid(pen.color, pen.thickness)),
                start_marker: Marker::None,
                end_marker: Marker::None,
                opacity: pen.opacity,
            }
        }
        Draft::SelectBox(rect) => Primitive::shape(
            PathData::rect(*rect),
            Some(SELECTION_COLOR.with_alpha(24)),
            Some(Stroke::solid(SELECTION_COLOR, width)),
        ),
        Draft::Lasso(points) => {
            if points.len() < 2 {
                return;
            }
            Primitive::shape(
                PathData::polygon(points.iter().copied()),
                Some(SELECTION_COLOR.with_alpha(24)),
                Some(Stroke::dashed(SELECTION_COLOR, width)),
            )
        }
    };
    list.push(Layer::Drafts, None, primitive);
}

/// Approximate caret after the last character; glyph width is taken as a
/// fixed fraction of the font size.
fn push_caret(list: &mut DisplayList, node: &Node, buffer: &str) {
    let block = text_block(node, buffer);
    let lines: Vec<&str> = buffer.split('\n').collect();
    let line_count = lines.len() as f32;
    let last_width = lines.last().map_or(0, |l| l.chars().count()) as f32 * block.size * 0.55;
    let rect = block.rect;
    let x = match block.align {
        TextAlign::Left => rect.left() + last_width,
        TextAlign::Center => rect.center().x + last_width * 0.5,
        TextAlign::Right => rect.right(),
    };
    let top = rect.center().y - line_count * block.line_height() * 0.5;
    let line_top = top + (line_count - 1.0) * block.line_height();
    list.push(
        Layer::Caret,
        Some(&node.id),
        Primitive::shape(
            PathData::new()
                .move_to(egui::pos2(x, line_top))
                .line_to(egui::pos2(x, line_top + block.line_height())),
            None,
            Some(Stroke::solid(block.color, 1.5)),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, Shape};

    fn two_nodes() -> Scene {
        let mut scene = Scene::default();
        scene.add_node(Node::new("z", NodeKind::Zone, egui::pos2(0.0, 0.0)));
        scene.add_node(Node::shape("a", Shape::Rect, egui::pos2(0.0, 0.0)));
        scene.add_node(Node::shape("b", Shape::Rect, egui::pos2(300.0, 0.0)));
        scene.add_connection(Connection::new("c", "a", "b"));
        scene
    }

    #[test]
    fn layers_are_emitted_in_paint_order() {
        let scene = two_nodes();
        let list = build_display_list(&RenderInput::export(&scene, DiagramType::Swot));
        let layers: Vec<Layer> = list.items.iter().map(|i| i.layer).collect();
        let mut sorted = layers.clone();
        sorted.sort();
        assert_eq!(layers, sorted);
        assert!(layers.contains(&Layer::Guides));
    }

    #[test]
    fn connection_gets_hit_area_beneath_stroke() {
        let scene = two_nodes();
        let list = build_display_list(&RenderInput::export(&scene, DiagramType::Freeform));
        let items: Vec<&Item> = list.in_layer(Layer::Connections).collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0].primitive, Primitive::HitArea { .. }));
        assert!(matches!(items[1].primitive, Primitive::Path { end_marker: Marker::Arrow, .. }));
    }

    #[test]
    fn dangling_connections_are_skipped() {
        let mut scene = two_nodes();
        scene.remove_node("b");
        let list = build_display_list(&RenderInput::export(&scene, DiagramType::Freeform));
        assert_eq!(list.in_layer(Layer::Connections).count(), 0);
    }

    #[test]
    fn hidden_nodes_are_not_drawn() {
        let mut scene = two_nodes();
        scene.update_node("a", |n| n.hidden = true);
        let list = build_display_list(&RenderInput::export(&scene, DiagramType::Freeform));
        assert!(list.items.iter().all(|i| i.owner.as_deref() != Some("a")));
        assert_eq!(list.in_layer(Layer::Connections).count(), 0);
    }

    #[test]
    fn selected_node_uses_highlight_stroke() {
        let scene = two_nodes();
        let selection = Selection::from_nodes(["a".to_string()]);
        let mut input = RenderInput::export(&scene, DiagramType::Freeform);
        input.selection = Some(&selection);
        let list = build_display_list(&input);
        let stroke = list
            .in_layer(Layer::Nodes)
            .find_map(|i| match &i.primitive {
                Primitive::Path { stroke, .. } if i.owner.as_deref() == Some("a") => stroke.clone(),
                _ => None,
            })
            .unwrap();
        assert_eq!(stroke.color, SELECTION_COLOR);
        assert!(stroke.width > 2.0);
    }
}
