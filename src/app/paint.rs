use eframe::egui;

use innolab::geometry::PathData;
use innolab::model::{FontFamily, FontStyle, LineStyle, Marker, Rgba, TextAlign, TextDecoration};
use innolab::render::{DisplayList, Primitive, Stroke, TextBlock};
use innolab::View;

use super::textures::TextureCache;

/// Maps world coordinates into the painter's screen space.
#[derive(Clone, Copy)]
pub(super) struct Transform {
    pub origin: egui::Pos2,
    pub view: View,
}

impl Transform {
    fn point(&self, world: egui::Pos2) -> egui::Pos2 {
        self.origin + self.view.world_to_screen(world).to_vec2()
    }

    fn rect(&self, world: egui::Rect) -> egui::Rect {
        self.view.world_rect_to_screen(world).translate(self.origin.to_vec2())
    }

    fn len(&self, world: f32) -> f32 {
        world * self.view.zoom
    }
}

pub(super) fn draw_background(painter: &egui::Painter, rect: egui::Rect, view: &View) {
    painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(248, 250, 252));
    let grid_color = egui::Color32::from_rgb(226, 232, 240);
    let spacing_screen = 40.0 * view.zoom;
    if spacing_screen < 12.0 {
        return;
    }
    let start = rect.min + view.pan;
    let x0 = ((rect.min.x - start.x) / spacing_screen).floor() * spacing_screen + start.x;
    let y0 = ((rect.min.y - start.y) / spacing_screen).floor() * spacing_screen + start.y;
    let mut x = x0;
    while x < rect.max.x {
        painter.line_segment(
            [egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)],
            egui::Stroke::new(1.0, grid_color),
        );
        x += spacing_screen;
    }
    let mut y = y0;
    while y < rect.max.y {
        painter.line_segment(
            [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
            egui::Stroke::new(1.0, grid_color),
        );
        y += spacing_screen;
    }
}

/// Paints every item in order. Returns true when something is animated and
/// the canvas should keep repainting.
pub(super) fn draw_display_list(
    painter: &egui::Painter,
    tf: Transform,
    list: &DisplayList,
    textures: &mut TextureCache,
) -> bool {
    let time = painter.ctx().input(|i| i.time) as f32;
    let mut animated = false;
    for item in &list.items {
        match &item.primitive {
            Primitive::Path {
                path,
                fill,
                stroke,
                start_marker,
                end_marker,
                opacity,
            } => {
                if let Some(stroke) = stroke {
                    animated |= stroke.animated;
                }
                draw_path(
                    painter,
                    tf,
                    path,
                    *fill,
                    stroke.as_ref(),
                    (*start_marker, *end_marker),
                    *opacity,
                    time,
                );
            }
            Primitive::Text(block) => draw_text(painter, tf, block),
            Primitive::Image { rect, href } => {
                let screen = tf.rect(*rect);
                match textures.get(painter.ctx(), href) {
                    Some(texture) => {
                        painter.image(
                            texture,
                            screen,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    None => {
                        painter.rect_filled(screen, 2.0, egui::Color32::from_gray(220));
                    }
                }
            }
            Primitive::HitArea { .. } => {}
        }
    }
    animated
}

fn color(rgba: Rgba, opacity: f32) -> egui::Color32 {
    rgba.to_color32().gamma_multiply(opacity.clamp(0.0, 1.0))
}

#[allow(clippy::too_many_arguments)]
fn draw_path(
    painter: &egui::Painter,
    tf: Transform,
    path: &PathData,
    fill: Option<Rgba>,
    stroke: Option<&Stroke>,
    markers: (Marker, Marker),
    opacity: f32,
    time: f32,
) {
    let subpaths = path.flatten();
    if let Some(fill) = fill.filter(|f| f.a > 0) {
        let fill = color(fill, opacity);
        for sub in subpaths.iter().filter(|s| s.closed) {
            let points: Vec<egui::Pos2> = sub.points.iter().map(|p| tf.point(*p)).collect();
            fill_star_shaped(painter, &points, fill);
        }
    }

    let Some(stroke) = stroke.filter(|s| s.width > 0.0 && s.color.a > 0) else {
        return;
    };
    let egui_stroke = egui::Stroke::new(tf.len(stroke.width).max(0.5), color(stroke.color, opacity));
    let pattern = dash_pattern(stroke, tf.len(stroke.width).max(1.0));
    for sub in &subpaths {
        let mut points: Vec<egui::Pos2> = sub.points.iter().map(|p| tf.point(*p)).collect();
        match pattern {
            None if sub.closed => {
                painter.add(egui::Shape::closed_line(points, egui_stroke));
            }
            None => {
                painter.add(egui::Shape::line(points, egui_stroke));
            }
            Some((dash, gap)) => {
                if sub.closed {
                    if let Some(first) = points.first().copied() {
                        points.push(first);
                    }
                }
                let phase = if stroke.animated {
                    (time * 30.0) % (dash + gap)
                } else {
                    0.0
                };
                draw_dashed_polyline(painter, &points, egui_stroke, dash, gap, phase);
            }
        }
    }

    let (start_marker, end_marker) = markers;
    if let Some((tip, toward)) = path.start_tangent() {
        draw_marker(painter, start_marker, tf.point(toward), tf.point(tip), egui_stroke);
    }
    if let Some((tip, toward)) = path.end_tangent() {
        draw_marker(painter, end_marker, tf.point(toward), tf.point(tip), egui_stroke);
    }
}

/// Fills a polygon as a fan around its centroid. Every outline the editor
/// produces is star-shaped about its center, which egui's convex fill is not.
fn fill_star_shaped(painter: &egui::Painter, points: &[egui::Pos2], fill: egui::Color32) {
    if points.len() < 3 {
        return;
    }
    let sum = points.iter().fold(egui::Vec2::ZERO, |acc, p| acc + p.to_vec2());
    let centroid = (sum / points.len() as f32).to_pos2();
    let mut mesh = egui::Mesh::default();
    mesh.colored_vertex(centroid, fill);
    for p in points {
        mesh.colored_vertex(*p, fill);
    }
    let n = points.len() as u32;
    for i in 0..n {
        mesh.add_triangle(0, 1 + i, 1 + (i + 1) % n);
    }
    painter.add(egui::Shape::mesh(mesh));
}

fn dash_pattern(stroke: &Stroke, width: f32) -> Option<(f32, f32)> {
    match stroke.dash {
        LineStyle::Dashed => Some((4.0 * width, 2.0 * width)),
        LineStyle::Dotted => Some((width, 2.0 * width)),
        LineStyle::Solid if stroke.animated => Some((4.0 * width, 2.0 * width)),
        LineStyle::Solid => None,
    }
}

fn draw_dashed_polyline(
    painter: &egui::Painter,
    points: &[egui::Pos2],
    stroke: egui::Stroke,
    dash_len: f32,
    gap_len: f32,
    phase: f32,
) {
    // Position inside the dash+gap period, carried across segments.
    let period = dash_len + gap_len;
    let mut offset = (period - phase).rem_euclid(period);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let v = b - a;
        let len = v.length();
        if len <= f32::EPSILON {
            continue;
        }
        let dir = v / len;
        let mut pos = 0.0;
        while pos < len {
            let (drawing, remaining) = if offset < dash_len {
                (true, dash_len - offset)
            } else {
                (false, period - offset)
            };
            let next_pos = (pos + remaining).min(len);
            if drawing {
                painter.line_segment([a + dir * pos, a + dir * next_pos], stroke);
            }
            offset = (offset + (next_pos - pos)) % period;
            pos = next_pos;
        }
    }
}

fn draw_marker(
    painter: &egui::Painter,
    marker: Marker,
    from: egui::Pos2,
    tip: egui::Pos2,
    stroke: egui::Stroke,
) {
    match marker {
        Marker::None => {}
        Marker::Arrow => draw_arrowhead(painter, from, tip, stroke),
        Marker::Circle => {
            painter.circle_filled(tip, (stroke.width * 2.0).max(3.0), stroke.color);
        }
    }
}

fn draw_arrowhead(painter: &egui::Painter, a: egui::Pos2, b: egui::Pos2, stroke: egui::Stroke) {
    let v = b - a;
    if v.length_sq() <= f32::EPSILON {
        return;
    }
    let dir = v.normalized();
    let size = (stroke.width * 4.0).max(8.0);
    let perp = egui::vec2(-dir.y, dir.x);
    let base = b - dir * size;
    let left = base + perp * (size * 0.5);
    let right = base - perp * (size * 0.5);
    painter.add(egui::Shape::convex_polygon(
        vec![b, left, right],
        stroke.color,
        egui::Stroke::NONE,
    ));
}

fn draw_text(painter: &egui::Painter, tf: Transform, block: &TextBlock) {
    if block.text.is_empty() {
        return;
    }
    let size = tf.len(block.size);
    if size < 2.0 {
        return;
    }
    let rect = tf.rect(block.rect);
    let text_color = block.color.to_color32();
    let family = match block.family {
        FontFamily::Monospace => egui::FontFamily::Monospace,
        _ => egui::FontFamily::Proportional,
    };
    let line = egui::Stroke::new((size / 14.0).max(1.0), text_color);
    let format = egui::TextFormat {
        font_id: egui::FontId::new(size, family),
        color: text_color,
        italics: block.style == FontStyle::Italic,
        underline: if block.decoration == TextDecoration::Underline {
            line
        } else {
            egui::Stroke::NONE
        },
        strikethrough: if block.decoration == TextDecoration::LineThrough {
            line
        } else {
            egui::Stroke::NONE
        },
        ..Default::default()
    };
    let mut job = egui::text::LayoutJob::single_section(block.text.clone(), format);
    job.wrap.max_width = rect.width().max(size);
    let (halign, x) = match block.align {
        TextAlign::Left => (egui::Align::LEFT, rect.left()),
        TextAlign::Center => (egui::Align::Center, rect.center().x),
        TextAlign::Right => (egui::Align::RIGHT, rect.right()),
    };
    job.halign = halign;
    let galley = painter.layout_job(job);
    let pos = egui::pos2(x, rect.center().y - galley.size().y * 0.5);
    painter.galley(pos, galley, text_color);
}
