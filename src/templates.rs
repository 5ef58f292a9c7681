//! Starter scenes and background guides for each diagram type.

use eframe::egui::{self, Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::model::{Connection, Node, NodeKind, Route, Shape};
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    #[default]
    Freeform,
    Mindmap,
    Swot,
    Canvas,
    Fishbone,
    Table,
    Flowchart,
}

impl DiagramType {
    pub const ALL: [DiagramType; 7] = [
        DiagramType::Freeform,
        DiagramType::Mindmap,
        DiagramType::Swot,
        DiagramType::Canvas,
        DiagramType::Fishbone,
        DiagramType::Table,
        DiagramType::Flowchart,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DiagramType::Freeform => "Freeform",
            DiagramType::Mindmap => "Mind map",
            DiagramType::Swot => "SWOT",
            DiagramType::Canvas => "Business canvas",
            DiagramType::Fishbone => "Fishbone",
            DiagramType::Table => "Table",
            DiagramType::Flowchart => "Flowchart",
        }
    }
}

/// Non-interactive decoration painted beneath the scene.
#[derive(Clone, Debug, PartialEq)]
pub enum Guide {
    Line { from: Pos2, to: Pos2 },
    Grid { area: Rect, spacing: f32 },
}

pub fn background_guides(diagram_type: DiagramType) -> Vec<Guide> {
    match diagram_type {
        DiagramType::Swot => vec![
            Guide::Line {
                from: egui::pos2(-440.0, 0.0),
                to: egui::pos2(440.0, 0.0),
            },
            Guide::Line {
                from: egui::pos2(0.0, -340.0),
                to: egui::pos2(0.0, 340.0),
            },
        ],
        DiagramType::Canvas => vec![Guide::Grid {
            area: Rect::from_min_max(egui::pos2(-560.0, -360.0), egui::pos2(560.0, 440.0)),
            spacing: 40.0,
        }],
        DiagramType::Fishbone => vec![Guide::Line {
            from: egui::pos2(-480.0, 0.0),
            to: egui::pos2(330.0, 0.0),
        }],
        DiagramType::Table => [-150.0, 150.0]
            .into_iter()
            .map(|x| Guide::Line {
                from: egui::pos2(x, -320.0),
                to: egui::pos2(x, 320.0),
            })
            .collect(),
        DiagramType::Freeform | DiagramType::Mindmap | DiagramType::Flowchart => Vec::new(),
    }
}

fn zone(id: &str, title: &str, rect: Rect) -> Node {
    Node::new(id, NodeKind::Zone, rect.center())
        .with_size(rect.width(), rect.height())
        .with_text(title)
}

fn link(id: &str, from: &str, to: &str, route: Route) -> Connection {
    let mut c = Connection::new(id, from, to);
    c.style.route = route;
    c
}

pub fn template(diagram_type: DiagramType) -> Scene {
    match diagram_type {
        DiagramType::Freeform => Scene::default(),
        DiagramType::Mindmap => mindmap(),
        DiagramType::Swot => swot(),
        DiagramType::Canvas => business_canvas(),
        DiagramType::Fishbone => fishbone(),
        DiagramType::Table => table(),
        DiagramType::Flowchart => flowchart(),
    }
}

fn mindmap() -> Scene {
    let mut scene = Scene::default();
    scene.add_node(
        Node::new("mm-root", NodeKind::Root { shape: Shape::Pill }, egui::pos2(0.0, 0.0))
            .with_text("Central idea"),
    );
    let branches = [
        ("mm-1", "Idea 1", egui::pos2(-300.0, -150.0)),
        ("mm-2", "Idea 2", egui::pos2(300.0, -150.0)),
        ("mm-3", "Idea 3", egui::pos2(-300.0, 150.0)),
        ("mm-4", "Idea 4", egui::pos2(300.0, 150.0)),
    ];
    for (i, (id, text, at)) in branches.into_iter().enumerate() {
        scene.add_node(Node::shape(id, Shape::Pill, at).with_text(text));
        scene.add_connection(link(&format!("mm-link-{}", i + 1), "mm-root", id, Route::Curved));
    }
    scene
}

fn swot() -> Scene {
    let mut scene = Scene::default();
    let quadrants = [
        ("swot-s", "Strengths", -210.0, -160.0),
        ("swot-w", "Weaknesses", 210.0, -160.0),
        ("swot-o", "Opportunities", -210.0, 160.0),
        ("swot-t", "Threats", 210.0, 160.0),
    ];
    for (id, title, x, y) in quadrants {
        let rect = Rect::from_center_size(egui::pos2(x, y), egui::vec2(400.0, 300.0));
        scene.add_node(zone(id, title, rect));
    }
    scene
}

fn business_canvas() -> Scene {
    let mut scene = Scene::default();
    // Five columns on top, two wide blocks underneath.
    let col_w = 220.0;
    let left = -550.0;
    let top = -350.0;
    let full_h = 480.0;
    let half_h = full_h / 2.0;
    let col = |i: f32| left + i * col_w;
    let blocks = [
        ("bmc-kp", "Key Partners", col(0.0), top, col_w, full_h),
        ("bmc-ka", "Key Activities", col(1.0), top, col_w, half_h),
        ("bmc-kr", "Key Resources", col(1.0), top + half_h, col_w, half_h),
        ("bmc-vp", "Value Propositions", col(2.0), top, col_w, full_h),
        ("bmc-cr", "Customer Relationships", col(3.0), top, col_w, half_h),
        ("bmc-ch", "Channels", col(3.0), top + half_h, col_w, half_h),
        ("bmc-cs", "Customer Segments", col(4.0), top, col_w, full_h),
        ("bmc-cost", "Cost Structure", left, top + full_h, col_w * 2.5, 300.0),
        ("bmc-rev", "Revenue Streams", left + col_w * 2.5, top + full_h, col_w * 2.5, 300.0),
    ];
    for (id, title, x, y, w, h) in blocks {
        let rect = Rect::from_min_size(egui::pos2(x, y), egui::vec2(w, h));
        scene.add_node(zone(id, title, rect));
    }
    scene
}

fn fishbone() -> Scene {
    let mut scene = Scene::default();
    scene.add_node(
        Node::new("fb-head", NodeKind::Root { shape: Shape::Rect }, egui::pos2(420.0, 0.0))
            .with_size(180.0, 90.0)
            .with_text("Problem"),
    );
    let causes = [
        ("fb-people", "People", -300.0, -200.0),
        ("fb-process", "Process", 0.0, -200.0),
        ("fb-tools", "Tools", -300.0, 200.0),
        ("fb-materials", "Materials", 0.0, 200.0),
    ];
    for (id, text, x, y) in causes {
        scene.add_node(Node::new(id, NodeKind::Label, egui::pos2(x, y)).with_text(text));
        scene.add_connection(link(&format!("{id}-bone"), id, "fb-head", Route::Straight));
    }
    scene
}

fn table() -> Scene {
    let mut scene = Scene::default();
    let columns = [("tbl-todo", "To do", -300.0), ("tbl-doing", "Doing", 0.0), ("tbl-done", "Done", 300.0)];
    for (id, title, x) in columns {
        scene.add_node(Node::new(id, NodeKind::Label, egui::pos2(x, -280.0)).with_text(title));
    }
    scene
}

fn flowchart() -> Scene {
    let mut scene = Scene::default();
    let steps = [
        ("fc-start", Shape::Pill, "Start", -200.0),
        ("fc-step", Shape::Rect, "Step", 0.0),
        ("fc-check", Shape::Diamond, "Decision?", 200.0),
        ("fc-end", Shape::Pill, "End", 400.0),
    ];
    for (id, shape, text, y) in steps {
        scene.add_node(Node::shape(id, shape, egui::pos2(0.0, y)).with_text(text));
    }
    for pair in steps.windows(2) {
        let (from, to) = (pair[0].0, pair[1].0);
        scene.add_connection(link(&format!("{from}-{to}"), from, to, Route::Step));
    }
    scene
}
