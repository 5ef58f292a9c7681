//! Anchoring and hit testing against real scenes.

use eframe::egui::{Rect, pos2};
use innolab::geometry::{self, PathData};
use innolab::model::{Node, Route, Shape};

use crate::helpers::{SceneBuilder, assert_pos_eq};

#[test]
fn circle_edge_point_lies_on_its_radius() {
    let circle = Node::shape("c", Shape::Circle, pos2(0.0, 0.0));

    assert_pos_eq(geometry::edge_intersection(&circle, pos2(100.0, 0.0)), pos2(50.0, 0.0));
    assert_pos_eq(geometry::edge_intersection(&circle, pos2(0.0, -300.0)), pos2(0.0, -50.0));
}

#[test]
fn edge_point_toward_own_center_is_the_center() {
    let rect = Node::shape("r", Shape::Rect, pos2(10.0, 10.0));
    assert_pos_eq(geometry::edge_intersection(&rect, pos2(10.0, 10.0)), pos2(10.0, 10.0));
}

#[test]
fn connection_endpoints_sit_on_facing_edges() {
    let scene = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .rect("b", 300.0, 0.0)
        .connect("c", "a", "b")
        .build();

    let (start, end) = geometry::connection_endpoints(&scene, &scene.connections[0]).unwrap();

    assert_pos_eq(start, pos2(50.0, 0.0));
    assert_pos_eq(end, pos2(250.0, 0.0));
}

#[test]
fn endpoints_vanish_with_hidden_or_missing_nodes() {
    let mut scene = SceneBuilder::new()
        .rect("a", 0.0, 0.0)
        .rect("b", 300.0, 0.0)
        .connect("c", "a", "b")
        .connect("dangling", "a", "gone")
        .build();
    assert!(geometry::connection_endpoints(&scene, &scene.connections[1]).is_none());

    scene.update_node("b", |n| n.hidden = true);
    assert!(geometry::connection_endpoints(&scene, &scene.connections[0]).is_none());
}

#[test]
fn every_route_joins_the_same_endpoints() {
    let (start, end) = (pos2(50.0, 0.0), pos2(250.0, 120.0));
    for route in [Route::Straight, Route::Curved, Route::Step] {
        let path: PathData = geometry::connection_path(route, start, end);
        assert_pos_eq(path.first_point().unwrap(), start);
        assert_pos_eq(path.last_point().unwrap(), end);
    }
}

#[test]
fn topmost_node_wins_overlaps() {
    let scene = SceneBuilder::new().rect("under", 0.0, 0.0).rect("over", 20.0, 0.0).build();

    let hit = geometry::topmost_node_at(&scene, pos2(10.0, 0.0), 0.0).map(|n| n.id.as_str());

    assert_eq!(hit, Some("over"));
}

#[test]
fn zones_lose_to_ordinary_nodes() {
    let zone = Node::new("z", innolab::model::NodeKind::Zone, pos2(0.0, 0.0));
    let scene = SceneBuilder::new().rect("n", 0.0, 0.0).node(zone).build();

    let hit = geometry::topmost_non_zone_at(&scene, pos2(0.0, 0.0), 0.0).map(|n| n.id.as_str());
    assert_eq!(hit, Some("n"));
    let hit = geometry::zone_grip_at(&scene, pos2(195.0, 0.0), 0.0).map(|n| n.id.as_str());
    assert_eq!(hit, Some("z"));
}

#[test]
fn zones_are_grabbed_by_title_band_or_border_only() {
    let zone = Node::new("z", innolab::model::NodeKind::Zone, pos2(0.0, 0.0));
    let scene = SceneBuilder::new().node(zone).build();
    let grip = |x: f32, y: f32| geometry::zone_grip_at(&scene, pos2(x, y), 4.0).is_some();

    assert!(grip(0.0, -140.0));
    assert!(grip(-198.0, 50.0));
    assert!(grip(0.0, 152.0));
    assert!(!grip(0.0, 0.0));
    assert!(!grip(150.0, 100.0));
    assert!(!grip(0.0, 160.0));
}

#[test]
fn nodes_in_rect_requires_full_containment() {
    let scene = SceneBuilder::new().rect("in", 0.0, 0.0).rect("partly", 120.0, 0.0).build();

    let hits = geometry::nodes_in_rect(&scene, Rect::from_min_max(pos2(-60.0, -60.0), pos2(100.0, 60.0)));

    assert_eq!(hits, vec!["in".to_string()]);
}

#[test]
fn bounds_cover_every_node() {
    let scene = SceneBuilder::new().rect("a", 0.0, 0.0).rect("b", 300.0, 200.0).build();

    let bounds = geometry::bounds_of(&scene.nodes).unwrap();

    assert_eq!(bounds, Rect::from_min_max(pos2(-50.0, -50.0), pos2(350.0, 250.0)));
}
