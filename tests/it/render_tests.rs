//! Display list construction and SVG output.

use eframe::egui::pos2;
use innolab::geometry;
use innolab::render::{self, Layer, Primitive, RenderInput};
use innolab::scene::Scene;
use innolab::svg;
use innolab::templates::{self, DiagramType};

use crate::helpers::{SceneBuilder, assert_pos_eq, click};

fn connection_path(list: &render::DisplayList) -> &geometry::PathData {
    list.in_layer(Layer::Connections)
        .find_map(|item| match &item.primitive {
            Primitive::Path { path, .. } => Some(path),
            _ => None,
        })
        .expect("connection path")
}

#[test]
fn connection_is_drawn_between_anchored_edges() {
    let scene = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .rect("b", 300.0, 0.0)
        .connect("c", "a", "b")
        .build();

    let list = render::build_display_list(&RenderInput::export(&scene, DiagramType::Freeform));
    let path = connection_path(&list);

    assert_pos_eq(path.first_point().unwrap(), pos2(50.0, 0.0));
    assert_pos_eq(path.last_point().unwrap(), pos2(250.0, 0.0));
}

#[test]
fn dangling_connections_are_not_drawn() {
    let scene = SceneBuilder::new().rect("a", 0.0, 0.0).connect("c", "a", "gone").build();

    let list = render::build_display_list(&RenderInput::export(&scene, DiagramType::Freeform));

    assert_eq!(list.in_layer(Layer::Connections).count(), 0);
}

#[test]
fn layers_are_emitted_in_paint_order() {
    let zone = innolab::model::Node::new("z", innolab::model::NodeKind::Zone, pos2(0.0, 0.0));
    let scene = SceneBuilder::new()
        .node(zone)
        .rect("a", 0.0, 0.0)
        .rect("b", 300.0, 0.0)
        .connect("c", "a", "b")
        .grouped("g", &["a", "b"])
        .build();

    let list = render::build_display_list(&RenderInput::export(&scene, DiagramType::Swot));
    let layers: Vec<Layer> = list.items.iter().map(|i| i.layer).collect();

    assert!(layers.windows(2).all(|w| w[0] <= w[1]), "{layers:?}");
    assert!(layers.contains(&Layer::Guides));
    assert!(layers.contains(&Layer::Groups));
}

#[test]
fn hidden_nodes_are_skipped() {
    let mut scene = SceneBuilder::new().rect("a", 0.0, 0.0).build();
    scene.update_node("a", |n| n.hidden = true);

    let list = render::build_display_list(&RenderInput::export(&scene, DiagramType::Freeform));

    assert!(list.items.iter().all(|i| i.owner.as_deref() != Some("a")));
}

#[test]
fn editor_overlays_show_handles_for_a_single_selection() {
    let mut editor = SceneBuilder::new().rect("a", 0.0, 0.0).editor();
    let bare = render::build_display_list(&editor.render_input());
    assert_eq!(bare.in_layer(Layer::Handles).count(), 0);

    click(&mut editor, pos2(0.0, 0.0));
    let selected = render::build_display_list(&editor.render_input());

    assert_eq!(selected.in_layer(Layer::Handles).count(), 4);
}

#[test]
fn svg_leaves_out_hit_areas() {
    let scene = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .rect("b", 300.0, 0.0)
        .connect("c", "a", "b")
        .build();
    let list = render::build_display_list(&RenderInput::export(&scene, DiagramType::Freeform));
    let visible_paths = list
        .items
        .iter()
        .filter(|i| matches!(i.primitive, Primitive::Path { .. }))
        .count();
    assert!(list.items.iter().any(|i| matches!(i.primitive, Primitive::HitArea { .. })));

    let doc = svg::to_svg(&list);

    assert!(doc.starts_with("<?xml"));
    assert!(doc.trim_end().ends_with("</svg>"));
    let drawn = doc.lines().filter(|l| l.starts_with("<path ")).count();
    assert_eq!(drawn, visible_paths);
    assert!(doc.contains("marker-end"));
}

#[test]
fn svg_escapes_node_text() {
    let node = innolab::model::Node::shape("a", innolab::model::Shape::Rect, pos2(0.0, 0.0))
        .with_text("R&D <2025>");
    let scene = SceneBuilder::new().node(node).build();

    let doc = svg::to_svg(&render::build_display_list(&RenderInput::export(
        &scene,
        DiagramType::Freeform,
    )));

    assert!(doc.contains("R&amp;D &lt;2025&gt;"));
    assert!(!doc.contains("R&D <2025>"));
}

#[test]
fn templates_only_connect_nodes_they_contain() {
    for diagram_type in DiagramType::ALL {
        let scene: Scene = templates::template(diagram_type);
        assert!(
            scene.dangling_connections().is_empty(),
            "{} has dangling connections",
            diagram_type.name()
        );
        let mut ids: Vec<&str> = scene.nodes.iter().map(|n| n.id.as_str()).collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count, "{} repeats node ids", diagram_type.name());
    }
}

#[test]
fn mindmap_template_has_a_root_and_four_branches() {
    let scene = templates::template(DiagramType::Mindmap);

    assert_eq!(scene.nodes.len(), 5);
    assert_eq!(scene.connections.len(), 4);
    assert!(scene.connections.iter().all(|c| c.from == "mm-root"));
    assert!(templates::template(DiagramType::Freeform).is_empty());
}
