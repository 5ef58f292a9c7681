use eframe::egui;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::model::{self, LineStyle, Marker, Rgba};
use crate::render::{DisplayList, Primitive, Stroke, TextBlock};

const PADDING: f32 = 24.0;

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn rgba_to_svg_rgb(rgba: Rgba) -> (String, f32) {
    (format!("rgb({},{},{})", rgba.r, rgba.g, rgba.b), rgba.opacity())
}

fn dasharray(line_style: LineStyle, stroke_width: f32) -> Option<String> {
    match line_style {
        LineStyle::Solid => None,
        LineStyle::Dashed => Some(format!("{} {}", stroke_width * 4.0, stroke_width * 2.5)),
        LineStyle::Dotted => Some(format!("{} {}", stroke_width * 0.5, stroke_width * 2.0)),
    }
}

fn marker_id(marker: Marker, color: Rgba) -> Option<String> {
    let kind = match marker {
        Marker::None => return None,
        Marker::Arrow => "arrow",
        Marker::Circle => "dot",
    };
    Some(format!("{kind}_{}_{}_{}_{}", color.r, color.g, color.b, color.a))
}

fn marker_def(marker: Marker, color: Rgba) -> String {
    let (rgb, opacity) = rgba_to_svg_rgb(color);
    let id = marker_id(marker, color).unwrap_or_default();
    let body = match marker {
        Marker::Circle => format!(
            r#"<circle cx="5" cy="5" r="3.5" fill="{rgb}" fill-opacity="{opacity:.3}"/>"#
        ),
        _ => format!(r#"<path d="M 0 0 L 10 5 L 0 10 z" fill="{rgb}" fill-opacity="{opacity:.3}"/>"#),
    };
    format!(
        r#"<marker id="{id}" markerWidth="10" markerHeight="10" refX="{}" refY="5" orient="auto-start-reverse" markerUnits="strokeWidth">{body}</marker>"#,
        if marker == Marker::Circle { 5 } else { 10 }
    )
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let (rgb, opacity) = rgba_to_svg_rgb(stroke.color);
    let mut out = format!(
        r#"stroke="{rgb}" stroke-opacity="{opacity:.3}" stroke-width="{:.3}" stroke-linecap="round" stroke-linejoin="round""#,
        stroke.width
    );
    // Animated connections without a dash pattern still need one to flow.
    let dash = dasharray(stroke.dash, stroke.width).or_else(|| {
        stroke
            .animated
            .then(|| dasharray(LineStyle::Dashed, stroke.width))
            .flatten()
    });
    if let Some(dash) = dash {
        let _ = write!(out, r#" stroke-dasharray="{dash}""#);
    }
    if stroke.animated {
        out.push_str(r#" class="flow""#);
    }
    out
}

fn fill_attrs(fill: Option<Rgba>) -> String {
    match fill {
        Some(rgba) if rgba.a > 0 => {
            let (rgb, opacity) = rgba_to_svg_rgb(rgba);
            format!(r#"fill="{rgb}" fill-opacity="{opacity:.3}""#)
        }
        _ => r#"fill="none""#.to_string(),
    }
}

fn svg_text_anchor(align: model::TextAlign) -> &'static str {
    match align {
        model::TextAlign::Left => "start",
        model::TextAlign::Center => "middle",
        model::TextAlign::Right => "end",
    }
}

fn font_class(family: model::FontFamily) -> &'static str {
    match family {
        model::FontFamily::SansSerif => "f-sans",
        model::FontFamily::Serif => "f-serif",
        model::FontFamily::Monospace => "f-mono",
        model::FontFamily::Handwritten => "f-hand",
    }
}

fn text_element(block: &TextBlock) -> String {
    let lines: Vec<&str> = block.text.split('\n').collect();
    let line_height = block.line_height();
    let x = match block.align {
        model::TextAlign::Left => block.rect.left(),
        model::TextAlign::Center => block.rect.center().x,
        model::TextAlign::Right => block.rect.right(),
    };
    let first_baseline = block.rect.center().y - (lines.len() as f32 - 1.0) * line_height * 0.5
        + block.size * 0.35;
    let (rgb, opacity) = rgba_to_svg_rgb(block.color);
    let weight = match block.weight {
        model::FontWeight::Normal => "normal",
        model::FontWeight::Bold => "bold",
    };
    let style = match block.style {
        model::FontStyle::Normal => "normal",
        model::FontStyle::Italic => "italic",
    };
    let decoration = match block.decoration {
        model::TextDecoration::None => String::new(),
        model::TextDecoration::Underline => r#" text-decoration="underline""#.to_string(),
        model::TextDecoration::LineThrough => r#" text-decoration="line-through""#.to_string(),
    };
    let mut out = format!(
        r#"<text class="{}" x="{x:.3}" y="{first_baseline:.3}" font-size="{:.3}" font-weight="{weight}" font-style="{style}"{decoration} text-anchor="{}" fill="{rgb}" fill-opacity="{opacity:.3}">"#,
        font_class(block.family),
        block.size,
        svg_text_anchor(block.align),
    );
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            out.push_str(&escape_xml(line));
        } else {
            let _ = write!(
                out,
                r#"<tspan x="{x:.3}" dy="{line_height:.3}">{}</tspan>"#,
                escape_xml(line)
            );
        }
    }
    out.push_str("</text>");
    out
}

fn style_block() -> String {
    let mut css = String::new();
    for family in model::FontFamily::ALL {
        let _ = writeln!(
            css,
            ".{} {{ font-family: {}; }}",
            font_class(family),
            family.css_stack()
        );
    }
    css.push_str("@keyframes dash-flow { to { stroke-dashoffset: -24; } }\n");
    css.push_str(".flow { animation: dash-flow 1s linear infinite; }\n");
    format!("<style>\n{css}</style>\n")
}

/// Self-contained SVG document for a display list. Hit areas are left out.
pub fn to_svg(list: &DisplayList) -> String {
    let bounds = list.bounds().unwrap_or_else(|| {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0))
    });
    let min_x = bounds.min.x - PADDING;
    let min_y = bounds.min.y - PADDING;
    let width = bounds.width() + PADDING * 2.0;
    let height = bounds.height() + PADDING * 2.0;

    let mut markers: BTreeMap<String, (Marker, Rgba)> = BTreeMap::new();
    for item in &list.items {
        if let Primitive::Path {
            stroke: Some(stroke),
            start_marker,
            end_marker,
            ..
        } = &item.primitive
        {
            for marker in [*start_marker, *end_marker] {
                if let Some(id) = marker_id(marker, stroke.color) {
                    markers.entry(id).or_insert((marker, stroke.color));
                }
            }
        }
    }

    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="{min_x:.3} {min_y:.3} {width:.3} {height:.3}" width="{width:.3}" height="{height:.3}">"#
    );
    out.push_str(&style_block());
    out.push_str("<defs>\n");
    for (marker, color) in markers.values() {
        out.push_str(&marker_def(*marker, *color));
        out.push('\n');
    }
    out.push_str("</defs>\n");
    let _ = writeln!(
        out,
        r#"<rect x="{min_x:.3}" y="{min_y:.3}" width="{width:.3}" height="{height:.3}" fill="white"/>"#
    );

    for item in &list.items {
        match &item.primitive {
            Primitive::HitArea { .. } => {}
            Primitive::Path {
                path,
                fill,
                stroke,
                start_marker,
                end_marker,
                opacity,
            } => {
                let mut attrs = fill_attrs(*fill);
                match stroke {
                    Some(stroke) => {
                        attrs.push(' ');
                        attrs.push_str(&stroke_attrs(stroke));
                        if let Some(id) = marker_id(*start_marker, stroke.color) {
                            let _ = write!(attrs, r#" marker-start="url(#{id})""#);
                        }
                        if let Some(id) = marker_id(*end_marker, stroke.color) {
                            let _ = write!(attrs, r#" marker-end="url(#{id})""#);
                        }
                    }
                    None => attrs.push_str(r#" stroke="none""#),
                }
                if *opacity < 1.0 {
                    let _ = write!(attrs, r#" opacity="{opacity:.3}""#);
                }
                let _ = writeln!(out, r#"<path d="{}" {attrs}/>"#, path.to_svg_d());
            }
            Primitive::Text(block) => {
                out.push_str(&text_element(block));
                out.push('\n');
            }
            Primitive::Image { rect, href } => {
                let _ = writeln!(
                    out,
                    r#"<image href="{}" x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" preserveAspectRatio="xMidYMid slice"/>"#,
                    escape_xml(href),
                    rect.min.x,
                    rect.min.y,
                    rect.width(),
                    rect.height()
                );
            }
        }
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connection, Node, NodeKind, Shape};
    use crate::render::{RenderInput, build_display_list};
    use crate::scene::Scene;
    use crate::templates::DiagramType;

    #[test]
    fn text_is_escaped_and_split_into_lines() {
        let mut scene = Scene::default();
        scene.add_node(
            Node::shape("a", Shape::Rect, egui::pos2(0.0, 0.0)).with_text("R&D\n<plan>"),
        );
        let svg = to_svg(&build_display_list(&RenderInput::export(&scene, DiagramType::Freeform)));
        assert!(svg.contains("R&amp;D"));
        assert!(svg.contains("&lt;plan&gt;"));
        assert!(svg.contains("<tspan"));
    }

    #[test]
    fn markers_and_animation_are_embedded() {
        let mut scene = Scene::default();
        scene.add_node(Node::shape("a", Shape::Rect, egui::pos2(0.0, 0.0)));
        scene.add_node(Node::new("b", NodeKind::Label, egui::pos2(400.0, 0.0)));
        let mut c = Connection::new("c", "a", "b");
        c.style.animated = true;
        scene.add_connection(c);
        let svg = to_svg(&build_display_list(&RenderInput::export(&scene, DiagramType::Freeform)));
        assert!(svg.contains("<marker id=\"arrow_71_85_105_255\""));
        assert!(svg.contains("marker-end=\"url(#arrow_71_85_105_255)\""));
        assert!(svg.contains("class=\"flow\""));
        assert!(svg.contains("@keyframes dash-flow"));
        // one visible stroke, no transparent hit path
        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
    }
}
