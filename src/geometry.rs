//! Pure geometry shared by the renderer and the hit tester.
//!
//! Every node kind resolves to one [`ShapeStrategy`] from a static table, so
//! the outline that gets painted and the boundary a connector is anchored to
//! always come from the same place.

use eframe::egui::{self, Pos2, Rect, Vec2};

use crate::model::{self, Connection, Node, NodeKind, Route, Shape};
use crate::scene::Scene;

const KAPPA: f32 = 0.552_284_8;
const CUBIC_STEPS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Pos2),
    LineTo(Pos2),
    CubicTo(Pos2, Pos2, Pos2),
    Close,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Subpath {
    pub points: Vec<Pos2>,
    pub closed: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
    pub cmds: Vec<PathCmd>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Pos2) -> Self {
        self.cmds.push(PathCmd::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Pos2) -> Self {
        self.cmds.push(PathCmd::LineTo(p));
        self
    }

    pub fn cubic_to(mut self, c1: Pos2, c2: Pos2, p: Pos2) -> Self {
        self.cmds.push(PathCmd::CubicTo(c1, c2, p));
        self
    }

    pub fn close(mut self) -> Self {
        self.cmds.push(PathCmd::Close);
        self
    }

    pub fn polyline(points: impl IntoIterator<Item = Pos2>) -> Self {
        let mut out = Self::new();
        for (i, p) in points.into_iter().enumerate() {
            out = if i == 0 { out.move_to(p) } else { out.line_to(p) };
        }
        out
    }

    pub fn polygon(points: impl IntoIterator<Item = Pos2>) -> Self {
        Self::polyline(points).close()
    }

    pub fn rect(rect: Rect) -> Self {
        Self::polygon([
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
        ])
    }

    pub fn rounded_rect(rect: Rect, radius: f32) -> Self {
        let r = radius.min(rect.width() * 0.5).min(rect.height() * 0.5).max(0.0);
        if r <= f32::EPSILON {
            return Self::rect(rect);
        }
        let k = r * KAPPA;
        let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
        Self::new()
            .move_to(egui::pos2(l + r, t))
            .line_to(egui::pos2(rt - r, t))
            .cubic_to(egui::pos2(rt - r + k, t), egui::pos2(rt, t + r - k), egui::pos2(rt, t + r))
            .line_to(egui::pos2(rt, b - r))
            .cubic_to(egui::pos2(rt, b - r + k), egui::pos2(rt - r + k, b), egui::pos2(rt - r, b))
            .line_to(egui::pos2(l + r, b))
            .cubic_to(egui::pos2(l + r - k, b), egui::pos2(l, b - r + k), egui::pos2(l, b - r))
            .line_to(egui::pos2(l, t + r))
            .cubic_to(egui::pos2(l, t + r - k), egui::pos2(l + r - k, t), egui::pos2(l + r, t))
            .close()
    }

    pub fn ellipse(center: Pos2, radius: Vec2) -> Self {
        let (cx, cy) = (center.x, center.y);
        let (rx, ry) = (radius.x, radius.y);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        Self::new()
            .move_to(egui::pos2(cx + rx, cy))
            .cubic_to(egui::pos2(cx + rx, cy + ky), egui::pos2(cx + kx, cy + ry), egui::pos2(cx, cy + ry))
            .cubic_to(egui::pos2(cx - kx, cy + ry), egui::pos2(cx - rx, cy + ky), egui::pos2(cx - rx, cy))
            .cubic_to(egui::pos2(cx - rx, cy - ky), egui::pos2(cx - kx, cy - ry), egui::pos2(cx, cy - ry))
            .cubic_to(egui::pos2(cx + kx, cy - ry), egui::pos2(cx + rx, cy - ky), egui::pos2(cx + rx, cy))
            .close()
    }

    pub fn first_point(&self) -> Option<Pos2> {
        self.cmds.iter().find_map(|c| match c {
            PathCmd::MoveTo(p) | PathCmd::LineTo(p) | PathCmd::CubicTo(_, _, p) => Some(*p),
            PathCmd::Close => None,
        })
    }

    pub fn last_point(&self) -> Option<Pos2> {
        self.cmds.iter().rev().find_map(|c| match c {
            PathCmd::MoveTo(p) | PathCmd::LineTo(p) | PathCmd::CubicTo(_, _, p) => Some(*p),
            PathCmd::Close => None,
        })
    }

    /// Direction the path leaves its first point, as `(tip, toward)`.
    pub fn start_tangent(&self) -> Option<(Pos2, Pos2)> {
        let mut it = self.cmds.iter();
        let Some(PathCmd::MoveTo(start)) = it.next() else {
            return None;
        };
        let next = match it.next()? {
            PathCmd::LineTo(p) => *p,
            PathCmd::CubicTo(c1, _, p) => {
                if (*c1 - *start).length_sq() > f32::EPSILON {
                    *c1
                } else {
                    *p
                }
            }
            _ => return None,
        };
        Some((*start, next))
    }

    /// Direction the path arrives at its last point, as `(tip, from)`.
    pub fn end_tangent(&self) -> Option<(Pos2, Pos2)> {
        let n = self.cmds.len();
        if n < 2 {
            return None;
        }
        let prev_point = |i: usize| -> Option<Pos2> {
            match self.cmds.get(i)? {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) | PathCmd::CubicTo(_, _, p) => Some(*p),
                PathCmd::Close => None,
            }
        };
        match self.cmds[n - 1] {
            PathCmd::LineTo(p) => Some((p, prev_point(n - 2)?)),
            PathCmd::CubicTo(_, c2, p) => {
                if (p - c2).length_sq() > f32::EPSILON {
                    Some((p, c2))
                } else {
                    Some((p, prev_point(n - 2)?))
                }
            }
            _ => None,
        }
    }

    pub fn flatten(&self) -> Vec<Subpath> {
        let mut out: Vec<Subpath> = Vec::new();
        let mut current: Vec<Pos2> = Vec::new();
        for cmd in &self.cmds {
            match *cmd {
                PathCmd::MoveTo(p) => {
                    if current.len() > 1 {
                        out.push(Subpath {
                            points: std::mem::take(&mut current),
                            closed: false,
                        });
                    }
                    current.clear();
                    current.push(p);
                }
                PathCmd::LineTo(p) => current.push(p),
                PathCmd::CubicTo(c1, c2, p) => {
                    let p0 = current.last().copied().unwrap_or(c1);
                    for i in 1..=CUBIC_STEPS {
                        let t = i as f32 / CUBIC_STEPS as f32;
                        current.push(cubic_point(p0, c1, c2, p, t));
                    }
                }
                PathCmd::Close => {
                    if current.len() > 1 {
                        out.push(Subpath {
                            points: std::mem::take(&mut current),
                            closed: true,
                        });
                    }
                }
            }
        }
        if current.len() > 1 {
            out.push(Subpath {
                points: current,
                closed: false,
            });
        }
        out
    }

    pub fn bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for sub in self.flatten() {
            for p in sub.points {
                let r = Rect::from_min_max(p, p);
                bounds = Some(bounds.map(|b| b.union(r)).unwrap_or(r));
            }
        }
        bounds
    }

    pub fn to_svg_d(&self) -> String {
        let mut out = String::new();
        for cmd in &self.cmds {
            if !out.is_empty() {
                out.push(' ');
            }
            match cmd {
                PathCmd::MoveTo(p) => out.push_str(&format!("M {:.2} {:.2}", p.x, p.y)),
                PathCmd::LineTo(p) => out.push_str(&format!("L {:.2} {:.2}", p.x, p.y)),
                PathCmd::CubicTo(c1, c2, p) => out.push_str(&format!(
                    "C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
                    c1.x, c1.y, c2.x, c2.y, p.x, p.y
                )),
                PathCmd::Close => out.push('Z'),
            }
        }
        out
    }
}

fn cubic_point(p0: Pos2, c1: Pos2, c2: Pos2, p1: Pos2, t: f32) -> Pos2 {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    egui::pos2(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}

/// Geometry for one node kind/shape: default size, painted outline, text
/// inset (relative to the node center) and connector anchoring.
pub struct ShapeStrategy {
    pub default_size: Vec2,
    pub outline: fn(Rect) -> PathData,
    pub text_area: fn(Vec2) -> Rect,
    pub boundary: fn(Pos2, Vec2, Vec2) -> Pos2,
}

// Indexed by `Shape as usize`; keep in declaration order.
static SHAPE_STRATEGIES: [ShapeStrategy; 11] = [
    ShapeStrategy {
        default_size: egui::vec2(180.0, 90.0),
        outline: outline_rect,
        text_area: text_area_inset8,
        boundary: rect_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(100.0, 100.0),
        outline: outline_ellipse,
        text_area: text_area_circle,
        boundary: ellipse_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(120.0, 120.0),
        outline: outline_diamond,
        text_area: text_area_diamond,
        boundary: diamond_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(160.0, 60.0),
        outline: outline_pill,
        text_area: text_area_pill,
        boundary: ellipse_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(120.0, 100.0),
        outline: outline_triangle,
        text_area: text_area_triangle,
        boundary: rect_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(140.0, 100.0),
        outline: outline_hexagon,
        text_area: text_area_hexagon,
        boundary: rect_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(120.0, 120.0),
        outline: outline_star,
        text_area: text_area_star,
        boundary: rect_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(180.0, 110.0),
        outline: outline_cloud,
        text_area: text_area_cloud,
        boundary: rect_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(120.0, 140.0),
        outline: outline_cylinder,
        text_area: text_area_cylinder,
        boundary: rect_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(160.0, 100.0),
        outline: outline_document,
        text_area: text_area_document,
        boundary: rect_boundary,
    },
    ShapeStrategy {
        default_size: egui::vec2(180.0, 90.0),
        outline: outline_parallelogram,
        text_area: text_area_parallelogram,
        boundary: rect_boundary,
    },
];

static LABEL_STRATEGY: ShapeStrategy = ShapeStrategy {
    default_size: egui::vec2(120.0, 40.0),
    outline: outline_plain_rect,
    text_area: text_area_inset4,
    boundary: rect_boundary,
};

static TEXT_STRATEGY: ShapeStrategy = ShapeStrategy {
    default_size: egui::vec2(200.0, 60.0),
    outline: outline_plain_rect,
    text_area: text_area_inset4,
    boundary: rect_boundary,
};

static STICKER_STRATEGY: ShapeStrategy = ShapeStrategy {
    default_size: egui::vec2(80.0, 80.0),
    outline: outline_sticker,
    text_area: text_area_inset6,
    boundary: rect_boundary,
};

static ZONE_STRATEGY: ShapeStrategy = ShapeStrategy {
    default_size: egui::vec2(400.0, 300.0),
    outline: outline_zone,
    text_area: text_area_zone_title,
    boundary: rect_boundary,
};

impl Shape {
    pub fn strategy(self) -> &'static ShapeStrategy {
        &SHAPE_STRATEGIES[self as usize]
    }
}

pub fn strategy_for(kind: &NodeKind) -> &'static ShapeStrategy {
    match kind {
        NodeKind::Generic { shape } | NodeKind::Root { shape } => shape.strategy(),
        NodeKind::Label => &LABEL_STRATEGY,
        NodeKind::Text => &TEXT_STRATEGY,
        NodeKind::Sticker { .. } => &STICKER_STRATEGY,
        NodeKind::Zone => &ZONE_STRATEGY,
    }
}

fn outline_rect(r: Rect) -> PathData {
    PathData::rounded_rect(r, 6.0)
}

fn outline_plain_rect(r: Rect) -> PathData {
    PathData::rect(r)
}

fn outline_sticker(r: Rect) -> PathData {
    PathData::rounded_rect(r, 2.0)
}

fn outline_zone(r: Rect) -> PathData {
    PathData::rounded_rect(r, 12.0)
}

fn outline_ellipse(r: Rect) -> PathData {
    PathData::ellipse(r.center(), r.size() * 0.5)
}

fn outline_pill(r: Rect) -> PathData {
    PathData::rounded_rect(r, r.width().min(r.height()) * 0.5)
}

fn outline_diamond(r: Rect) -> PathData {
    let c = r.center();
    PathData::polygon([
        egui::pos2(c.x, r.top()),
        egui::pos2(r.right(), c.y),
        egui::pos2(c.x, r.bottom()),
        egui::pos2(r.left(), c.y),
    ])
}

fn outline_triangle(r: Rect) -> PathData {
    PathData::polygon([
        egui::pos2(r.center().x, r.top()),
        r.right_bottom(),
        r.left_bottom(),
    ])
}

fn outline_hexagon(r: Rect) -> PathData {
    let q = r.width() * 0.25;
    let cy = r.center().y;
    PathData::polygon([
        egui::pos2(r.left() + q, r.top()),
        egui::pos2(r.right() - q, r.top()),
        egui::pos2(r.right(), cy),
        egui::pos2(r.right() - q, r.bottom()),
        egui::pos2(r.left() + q, r.bottom()),
        egui::pos2(r.left(), cy),
    ])
}

fn outline_star(r: Rect) -> PathData {
    let c = r.center();
    let outer = r.size() * 0.5;
    let inner = outer * 0.45;
    let points = (0..10).map(|i| {
        let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
        let radius = if i % 2 == 0 { outer } else { inner };
        egui::pos2(c.x + radius.x * angle.cos(), c.y + radius.y * angle.sin())
    });
    PathData::polygon(points)
}

fn outline_cloud(r: Rect) -> PathData {
    let c = r.center();
    let radius = r.size() * 0.42;
    let bumps = 8;
    let on_ellipse = |i: usize| {
        let angle = i as f32 * std::f32::consts::TAU / bumps as f32;
        egui::pos2(c.x + radius.x * angle.cos(), c.y + radius.y * angle.sin())
    };
    let mut path = PathData::new().move_to(on_ellipse(0));
    for i in 0..bumps {
        let a = on_ellipse(i);
        let b = on_ellipse(i + 1);
        let push = |p: Pos2| c + (p - c) * 1.28;
        let c1 = push(a + (b - a) * 0.1);
        let c2 = push(a + (b - a) * 0.9);
        path = path.cubic_to(c1, c2, b);
    }
    path.close()
}

fn half_ellipse(path: PathData, center: Pos2, radius: Vec2, lower: bool) -> PathData {
    // Left-to-right sweep through the bottom (lower) or right-to-left through the top.
    let (cx, cy) = (center.x, center.y);
    let (rx, ry) = (radius.x, radius.y);
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    if lower {
        path.cubic_to(egui::pos2(cx - rx, cy + ky), egui::pos2(cx - kx, cy + ry), egui::pos2(cx, cy + ry))
            .cubic_to(egui::pos2(cx + kx, cy + ry), egui::pos2(cx + rx, cy + ky), egui::pos2(cx + rx, cy))
    } else {
        path.cubic_to(egui::pos2(cx + rx, cy - ky), egui::pos2(cx + kx, cy - ry), egui::pos2(cx, cy - ry))
            .cubic_to(egui::pos2(cx - kx, cy - ry), egui::pos2(cx - rx, cy - ky), egui::pos2(cx - rx, cy))
    }
}

fn outline_cylinder(r: Rect) -> PathData {
    let ry = r.height() * 0.1;
    let radius = egui::vec2(r.width() * 0.5, ry);
    let top_c = egui::pos2(r.center().x, r.top() + ry);
    let bottom_c = egui::pos2(r.center().x, r.bottom() - ry);
    let body = PathData::new()
        .move_to(egui::pos2(r.left(), top_c.y))
        .line_to(egui::pos2(r.left(), bottom_c.y));
    let body = half_ellipse(body, bottom_c, radius, true).line_to(egui::pos2(r.right(), top_c.y));
    let body = half_ellipse(body, top_c, radius, false).close();
    let lip = body.move_to(egui::pos2(r.left(), top_c.y));
    half_ellipse(lip, top_c, radius, true)
}

fn outline_document(r: Rect) -> PathData {
    let a = r.height() * 0.08;
    let w = r.width();
    PathData::new()
        .move_to(r.left_top())
        .line_to(r.right_top())
        .line_to(egui::pos2(r.right(), r.bottom() - a))
        .cubic_to(
            egui::pos2(r.right() - w * 0.25, r.bottom() - a * 3.0),
            egui::pos2(r.left() + w * 0.25, r.bottom() + a),
            egui::pos2(r.left(), r.bottom() - a),
        )
        .close()
}

fn outline_parallelogram(r: Rect) -> PathData {
    let skew = r.width() * 0.2;
    PathData::polygon([
        egui::pos2(r.left() + skew, r.top()),
        r.right_top(),
        egui::pos2(r.right() - skew, r.bottom()),
        r.left_bottom(),
    ])
}

fn centered(w: f32, h: f32) -> Rect {
    Rect::from_center_size(egui::Pos2::ZERO, egui::vec2(w.max(0.0), h.max(0.0)))
}

fn offset_centered(dy: f32, w: f32, h: f32) -> Rect {
    Rect::from_center_size(egui::pos2(0.0, dy), egui::vec2(w.max(0.0), h.max(0.0)))
}

fn text_area_inset4(s: Vec2) -> Rect {
    centered(s.x - 8.0, s.y - 8.0)
}

fn text_area_inset6(s: Vec2) -> Rect {
    centered(s.x - 12.0, s.y - 12.0)
}

fn text_area_inset8(s: Vec2) -> Rect {
    centered(s.x - 16.0, s.y - 16.0)
}

fn text_area_circle(s: Vec2) -> Rect {
    centered(s.x * 0.7, s.y * 0.7)
}

fn text_area_diamond(s: Vec2) -> Rect {
    centered(s.x * 0.65, s.y * 0.65)
}

fn text_area_pill(s: Vec2) -> Rect {
    centered(s.x - s.y * 0.6, s.y - 12.0)
}

fn text_area_triangle(s: Vec2) -> Rect {
    offset_centered(s.y * 0.15, s.x * 0.5, s.y * 0.45)
}

fn text_area_hexagon(s: Vec2) -> Rect {
    centered(s.x * 0.7, s.y * 0.8)
}

fn text_area_star(s: Vec2) -> Rect {
    offset_centered(s.y * 0.05, s.x * 0.32, s.y * 0.25)
}

fn text_area_cloud(s: Vec2) -> Rect {
    centered(s.x * 0.65, s.y * 0.55)
}

fn text_area_cylinder(s: Vec2) -> Rect {
    offset_centered(s.y * 0.08, s.x - 16.0, s.y * 0.6)
}

fn text_area_document(s: Vec2) -> Rect {
    offset_centered(-s.y * 0.04, s.x - 16.0, s.y * 0.7)
}

fn text_area_parallelogram(s: Vec2) -> Rect {
    centered(s.x * 0.65, s.y - 16.0)
}

fn text_area_zone_title(s: Vec2) -> Rect {
    let w = (s.x - 24.0).max(0.0);
    Rect::from_min_size(egui::pos2(-s.x * 0.5 + 12.0, -s.y * 0.5 + 8.0), egui::vec2(w, 28.0_f32.min(s.y)))
}

fn ellipse_boundary(center: Pos2, half: Vec2, dir: Vec2) -> Pos2 {
    let angle = dir.y.atan2(dir.x);
    egui::pos2(center.x + half.x * angle.cos(), center.y + half.y * angle.sin())
}

fn diamond_boundary(center: Pos2, half: Vec2, dir: Vec2) -> Pos2 {
    if half.x <= f32::EPSILON || half.y <= f32::EPSILON {
        return center;
    }
    let s = 1.0 / (dir.x.abs() / half.x + dir.y.abs() / half.y);
    center + dir * s
}

fn rect_boundary(center: Pos2, half: Vec2, dir: Vec2) -> Pos2 {
    if dir.x.abs() * half.y >= dir.y.abs() * half.x {
        let t = half.x / dir.x.abs();
        egui::pos2(center.x + half.x * dir.x.signum(), center.y + dir.y * t)
    } else {
        let t = half.y / dir.y.abs();
        egui::pos2(center.x + dir.x * t, center.y + half.y * dir.y.signum())
    }
}

pub fn node_dimensions(node: &Node) -> Vec2 {
    let default = strategy_for(&node.kind).default_size;
    egui::vec2(
        node.width.unwrap_or(default.x),
        node.height.unwrap_or(default.y),
    )
}

pub fn node_rect(node: &Node) -> Rect {
    Rect::from_center_size(node.center(), node_dimensions(node))
}

pub fn node_outline(node: &Node) -> PathData {
    (strategy_for(&node.kind).outline)(node_rect(node))
}

/// Text layout box relative to the node center.
pub fn safe_text_area(node: &Node, w: f32, h: f32) -> Rect {
    (strategy_for(&node.kind).text_area)(egui::vec2(w, h))
}

pub fn text_rect(node: &Node) -> Rect {
    let size = node_dimensions(node);
    safe_text_area(node, size.x, size.y).translate(node.center().to_vec2())
}

/// Boundary point of the node's shape on the ray from its center toward `toward`.
pub fn edge_intersection(node: &Node, toward: Pos2) -> Pos2 {
    let center = node.center();
    let dir = toward - center;
    if dir.length_sq() <= f32::EPSILON {
        return center;
    }
    let half = node_dimensions(node) * 0.5;
    (strategy_for(&node.kind).boundary)(center, half, dir)
}

pub fn connection_path(route: Route, start: Pos2, end: Pos2) -> PathData {
    match route {
        Route::Straight => PathData::new().move_to(start).line_to(end),
        Route::Curved => {
            let d = end - start;
            let (c1, c2) = if d.x.abs() >= d.y.abs() {
                (
                    egui::pos2(start.x + d.x * 0.5, start.y),
                    egui::pos2(end.x - d.x * 0.5, end.y),
                )
            } else {
                (
                    egui::pos2(start.x, start.y + d.y * 0.5),
                    egui::pos2(end.x, end.y - d.y * 0.5),
                )
            };
            PathData::new().move_to(start).cubic_to(c1, c2, end)
        }
        Route::Step => {
            let mid_x = (start.x + end.x) * 0.5;
            PathData::polyline([
                start,
                egui::pos2(mid_x, start.y),
                egui::pos2(mid_x, end.y),
                end,
            ])
        }
    }
}

/// Anchored start/end of a connection, or `None` if an endpoint is missing
/// or hidden.
pub fn connection_endpoints(scene: &Scene, connection: &Connection) -> Option<(Pos2, Pos2)> {
    let from = scene.node(&connection.from).filter(|n| !n.hidden)?;
    let to = scene.node(&connection.to).filter(|n| !n.hidden)?;
    let start = edge_intersection(from, to.center());
    let end = edge_intersection(to, from.center());
    Some((start, end))
}

pub fn connection_geometry(scene: &Scene, connection: &Connection) -> Option<PathData> {
    let (start, end) = connection_endpoints(scene, connection)?;
    Some(connection_path(connection.style.route, start, end))
}

pub fn distance_to_path(path: &PathData, p: Pos2) -> f32 {
    let mut best = f32::INFINITY;
    for sub in path.flatten() {
        for pair in sub.points.windows(2) {
            best = best.min(model::distance_to_segment(p, pair[0], pair[1]));
        }
        if sub.closed {
            if let (Some(first), Some(last)) = (sub.points.first(), sub.points.last()) {
                best = best.min(model::distance_to_segment(p, *last, *first));
            }
        }
    }
    best
}

pub fn node_contains(node: &Node, p: Pos2, tolerance: f32) -> bool {
    node_rect(node).expand(tolerance).contains(p)
}

/// Topmost visible node under `p`: regular nodes first (reverse paint
/// order), then zones, which sit beneath everything else.
pub fn topmost_node_at<'a>(scene: &'a Scene, p: Pos2, tolerance: f32) -> Option<&'a Node> {
    let visible = || scene.nodes.iter().rev().filter(|n| !n.hidden);
    visible()
        .filter(|n| !n.kind.is_zone())
        .find(|n| node_contains(n, p, tolerance))
        .or_else(|| {
            visible()
                .filter(|n| n.kind.is_zone())
                .find(|n| node_contains(n, p, tolerance))
        })
}

pub fn topmost_non_zone_at<'a>(scene: &'a Scene, p: Pos2, tolerance: f32) -> Option<&'a Node> {
    scene
        .nodes
        .iter()
        .rev()
        .filter(|n| !n.hidden && !n.kind.is_zone())
        .find(|n| node_contains(n, p, tolerance))
}

const ZONE_TITLE_BAND: f32 = 36.0;
const ZONE_BORDER_GRIP: f32 = 8.0;

/// Whether `p` lies on a zone's title band or border. The interior is left
/// to the canvas so area selection can start inside a zone.
pub fn zone_grip_contains(node: &Node, p: Pos2, tolerance: f32) -> bool {
    let rect = node_rect(node);
    if !rect.expand(tolerance).contains(p) {
        return false;
    }
    let inset = ZONE_BORDER_GRIP + tolerance;
    let interior = Rect::from_min_max(
        egui::pos2(rect.min.x + inset, rect.min.y + ZONE_TITLE_BAND.min(rect.height())),
        egui::pos2(rect.max.x - inset, rect.max.y - inset),
    );
    !interior.contains(p)
}

pub fn zone_grip_at<'a>(scene: &'a Scene, p: Pos2, tolerance: f32) -> Option<&'a Node> {
    scene
        .nodes
        .iter()
        .rev()
        .filter(|n| !n.hidden && n.kind.is_zone())
        .find(|n| zone_grip_contains(n, p, tolerance))
}

/// Topmost resolvable connection whose widened hit area covers `p`.
pub fn connection_at<'a>(scene: &'a Scene, p: Pos2, hit_width: f32) -> Option<&'a Connection> {
    scene.connections.iter().rev().find(|c| {
        connection_geometry(scene, c)
            .map(|path| distance_to_path(&path, p) <= (hit_width + c.style.thickness) * 0.5)
            .unwrap_or(false)
    })
}

pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.min.x <= inner.min.x
        && outer.min.y <= inner.min.y
        && outer.max.x >= inner.max.x
        && outer.max.y >= inner.max.y
}

pub fn polygon_contains(points: &[Pos2], p: Pos2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Visible nodes whose bounding rectangle lies entirely inside `area`.
pub fn nodes_in_rect(scene: &Scene, area: Rect) -> Vec<String> {
    scene
        .nodes
        .iter()
        .filter(|n| !n.hidden && rect_contains_rect(area, node_rect(n)))
        .map(|n| n.id.clone())
        .collect()
}

pub fn nodes_in_polygon(scene: &Scene, lasso: &[Pos2]) -> Vec<String> {
    scene
        .nodes
        .iter()
        .filter(|n| {
            if n.hidden {
                return false;
            }
            let r = node_rect(n);
            [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom()]
                .into_iter()
                .all(|c| polygon_contains(lasso, c))
        })
        .map(|n| n.id.clone())
        .collect()
}

pub fn bounds_of<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Option<Rect> {
    nodes
        .into_iter()
        .map(node_rect)
        .reduce(|a, b| a.union(b))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    NW,
    NE,
    SW,
    SE,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::NW, Corner::NE, Corner::SW, Corner::SE];

    pub fn point(self, rect: Rect) -> Pos2 {
        match self {
            Corner::NW => rect.left_top(),
            Corner::NE => rect.right_top(),
            Corner::SW => rect.left_bottom(),
            Corner::SE => rect.right_bottom(),
        }
    }

    pub fn opposite(self) -> Corner {
        match self {
            Corner::NW => Corner::SE,
            Corner::NE => Corner::SW,
            Corner::SW => Corner::NE,
            Corner::SE => Corner::NW,
        }
    }

    pub fn sign(self) -> Vec2 {
        match self {
            Corner::NW => egui::vec2(-1.0, -1.0),
            Corner::NE => egui::vec2(1.0, -1.0),
            Corner::SW => egui::vec2(-1.0, 1.0),
            Corner::SE => egui::vec2(1.0, 1.0),
        }
    }
}

pub fn handle_rect(rect: Rect, corner: Corner, size: f32) -> Rect {
    Rect::from_center_size(corner.point(rect), egui::vec2(size, size))
}

pub fn corner_handle_at(rect: Rect, p: Pos2, size: f32) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .find(|c| handle_rect(rect, *c, size).contains(p))
}
