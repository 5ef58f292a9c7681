use eframe::egui;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorParseError;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_pos2(p: egui::Pos2) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn to_pos2(self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }
}

/// Straight (non-premultiplied) RGBA color, serialized as `#rrggbb[aa]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || ColorParseError(s.to_string());
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2).ok_or_else(bad)?, 16).map_err(|_| bad());
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, ch) in hex.chars().enumerate() {
                    let v = ch.to_digit(16).ok_or_else(bad)? as u8;
                    out[i] = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(bad()),
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    pub fn from_color32(c: egui::Color32) -> Self {
        let [r, g, b, a] = c.to_srgba_unmultiplied();
        Self { r, g, b, a }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::from_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_hex()
    }
}

/// `None` is stored as the literal `"transparent"`.
mod fill_serde {
    use super::*;

    pub fn serialize<S: Serializer>(fill: &Option<Rgba>, s: S) -> Result<S::Ok, S::Error> {
        match fill {
            Some(c) => s.serialize_str(&c.to_hex()),
            None => s.serialize_str("transparent"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Rgba>, D::Error> {
        let s = String::deserialize(d)?;
        if s.is_empty() || s.eq_ignore_ascii_case("transparent") || s.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        Rgba::from_hex(&s).map(Some).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

impl BorderStyle {
    pub fn line_style(self) -> Option<LineStyle> {
        match self {
            BorderStyle::Solid => Some(LineStyle::Solid),
            BorderStyle::Dashed => Some(LineStyle::Dashed),
            BorderStyle::Dotted => Some(LineStyle::Dotted),
            BorderStyle::None => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
    Handwritten,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::SansSerif,
        FontFamily::Serif,
        FontFamily::Monospace,
        FontFamily::Handwritten,
    ];

    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::SansSerif => "Inter, Helvetica, Arial, sans-serif",
            FontFamily::Serif => "Georgia, 'Times New Roman', serif",
            FontFamily::Monospace => "'JetBrains Mono', Menlo, monospace",
            FontFamily::Handwritten => "'Comic Neue', 'Comic Sans MS', cursive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FontFamily::SansSerif => "Sans",
            FontFamily::Serif => "Serif",
            FontFamily::Monospace => "Mono",
            FontFamily::Handwritten => "Hand",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Rect,
    Circle,
    Diamond,
    Pill,
    Triangle,
    Hexagon,
    Star,
    Cloud,
    Cylinder,
    Document,
    Parallelogram,
}

impl Shape {
    pub const ALL: [Shape; 11] = [
        Shape::Rect,
        Shape::Circle,
        Shape::Diamond,
        Shape::Pill,
        Shape::Triangle,
        Shape::Hexagon,
        Shape::Star,
        Shape::Cloud,
        Shape::Cylinder,
        Shape::Document,
        Shape::Parallelogram,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Rect => "Rectangle",
            Shape::Circle => "Circle",
            Shape::Diamond => "Diamond",
            Shape::Pill => "Pill",
            Shape::Triangle => "Triangle",
            Shape::Hexagon => "Hexagon",
            Shape::Star => "Star",
            Shape::Cloud => "Cloud",
            Shape::Cylinder => "Cylinder",
            Shape::Document => "Document",
            Shape::Parallelogram => "Parallelogram",
        }
    }
}

/// Node variant. `shape` only exists where it means something.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Generic {
        #[serde(default)]
        shape: Shape,
    },
    Root {
        #[serde(default)]
        shape: Shape,
    },
    Label,
    Text,
    Sticker {
        #[serde(
            default,
            rename = "backgroundImage",
            skip_serializing_if = "Option::is_none"
        )]
        background_image: Option<String>,
    },
    Zone,
}

impl NodeKind {
    pub fn shape(&self) -> Option<Shape> {
        match self {
            NodeKind::Generic { shape } | NodeKind::Root { shape } => Some(*shape),
            _ => None,
        }
    }

    pub fn is_zone(&self) -> bool {
        matches!(self, NodeKind::Zone)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Generic { .. } => "generic",
            NodeKind::Root { .. } => "root",
            NodeKind::Label => "label",
            NodeKind::Text => "text",
            NodeKind::Sticker { .. } => "sticker",
            NodeKind::Zone => "zone",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStyle {
    #[serde(with = "fill_serde")]
    pub fill: Option<Rgba>,
    pub text_color: Rgba,
    pub border_color: Rgba,
    pub border_width: f32,
    pub border_style: BorderStyle,
    pub font_family: FontFamily,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub text_align: TextAlign,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            fill: Some(Rgba::WHITE),
            text_color: Rgba::rgb(31, 41, 55),
            border_color: Rgba::rgb(31, 41, 55),
            border_width: 2.0,
            border_style: BorderStyle::Solid,
            font_family: FontFamily::SansSerif,
            font_size: 14.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            text_align: TextAlign::Center,
        }
    }
}

impl NodeStyle {
    pub fn for_kind(kind: &NodeKind) -> Self {
        let base = Self::default();
        match kind {
            NodeKind::Generic { .. } => base,
            NodeKind::Root { .. } => Self {
                fill: Some(Rgba::rgb(79, 70, 229)),
                text_color: Rgba::WHITE,
                border_color: Rgba::rgb(55, 48, 163),
                border_width: 3.0,
                font_size: 18.0,
                font_weight: FontWeight::Bold,
                ..base
            },
            NodeKind::Label => Self {
                fill: None,
                border_width: 0.0,
                border_style: BorderStyle::None,
                ..base
            },
            NodeKind::Text => Self {
                fill: None,
                border_width: 0.0,
                border_style: BorderStyle::None,
                font_size: 16.0,
                text_align: TextAlign::Left,
                ..base
            },
            NodeKind::Sticker { .. } => Self {
                fill: Some(Rgba::rgb(253, 230, 138)),
                border_color: Rgba::rgb(245, 158, 11),
                border_width: 1.0,
                font_size: 12.0,
                ..base
            },
            NodeKind::Zone => Self {
                fill: Some(Rgba::rgba(241, 245, 249, 128)),
                text_color: Rgba::rgb(71, 85, 105),
                border_color: Rgba::rgb(148, 163, 184),
                border_style: BorderStyle::Dashed,
                font_weight: FontWeight::Bold,
                text_align: TextAlign::Left,
                ..base
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub style: NodeStyle,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, center: egui::Pos2) -> Self {
        let style = NodeStyle::for_kind(&kind);
        let text = match &kind {
            NodeKind::Root { .. } => "Main topic",
            NodeKind::Label => "Label",
            NodeKind::Text => "Text",
            NodeKind::Zone => "Zone",
            NodeKind::Generic { .. } | NodeKind::Sticker { .. } => "",
        };
        Self {
            id: id.into(),
            x: center.x,
            y: center.y,
            width: None,
            height: None,
            kind,
            style,
            text: text.to_string(),
            group_id: None,
            locked: false,
            hidden: false,
        }
    }

    pub fn shape(id: impl Into<String>, shape: Shape, center: egui::Pos2) -> Self {
        Self::new(id, NodeKind::Generic { shape }, center)
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn center(&self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }

    pub fn set_center(&mut self, p: egui::Pos2) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Nodes that can be dragged or resized.
    pub fn is_movable(&self) -> bool {
        !self.locked && !self.hidden
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Straight,
    #[default]
    Curved,
    Step,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    #[default]
    None,
    Circle,
    Arrow,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionStyle {
    pub color: Rgba,
    pub thickness: f32,
    pub dash: LineStyle,
    pub route: Route,
    pub start_marker: Marker,
    pub end_marker: Marker,
    pub animated: bool,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            color: Rgba::rgb(71, 85, 105),
            thickness: 2.0,
            dash: LineStyle::Solid,
            route: Route::Curved,
            start_marker: Marker::None,
            end_marker: Marker::Arrow,
            animated: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub style: ConnectionStyle,
}

impl Connection {
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            style: ConnectionStyle::default(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}

/// Highlighter stroke; points are fixed once the stroke is committed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FreehandPath {
    pub id: String,
    pub points: Vec<Point>,
    pub color: Rgba,
    pub thickness: f32,
    pub opacity: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PenStyle {
    pub color: Rgba,
    pub thickness: f32,
    pub opacity: f32,
}

impl Default for PenStyle {
    fn default() -> Self {
        Self {
            color: Rgba::rgb(250, 204, 21),
            thickness: 12.0,
            opacity: 0.4,
        }
    }
}

impl FreehandPath {
    pub fn new(id: impl Into<String>, points: Vec<Point>, pen: &PenStyle) -> Self {
        Self {
            id: id.into(),
            points,
            color: pen.color,
            thickness: pen.thickness,
            opacity: pen.opacity,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = egui::Pos2> + '_ {
        self.points.iter().map(|p| p.to_pos2())
    }
}

pub fn distance_to_segment(p: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let ab_len2 = ab.x * ab.x + ab.y * ab.y;
    if ab_len2 <= f32::EPSILON {
        return (p - a).length();
    }
    let t = (ap.x * ab.x + ap.y * ab.y) / ab_len2;
    let t = t.clamp(0.0, 1.0);
    let closest = a + ab * t;
    (p - closest).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_short_long_and_alpha_forms() {
        assert_eq!(Rgba::from_hex("#fff").unwrap(), Rgba::WHITE);
        assert_eq!(Rgba::from_hex("#102030").unwrap(), Rgba::rgb(16, 32, 48));
        assert_eq!(
            Rgba::from_hex("#10203080").unwrap(),
            Rgba::rgba(16, 32, 48, 128)
        );
        assert!(Rgba::from_hex("#12").is_err());
        assert!(Rgba::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn node_json_uses_type_tag_and_transparent_fill() {
        let node = Node::new("n1", NodeKind::Label, egui::pos2(1.0, 2.0));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "label");
        assert_eq!(json["style"]["fill"], "transparent");
        assert!(json.get("shape").is_none());
        assert!(json.get("width").is_none());

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn generic_node_defaults_shape_when_missing() {
        let node: Node = serde_json::from_str(
            r#"{"id":"a","x":0,"y":0,"type":"generic","text":"hi","groupId":"g1"}"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Generic { shape: Shape::Rect });
        assert_eq!(node.group_id.as_deref(), Some("g1"));
        assert_eq!(node.style, NodeStyle::default());
    }

    #[test]
    fn sticker_image_uses_camel_case_key() {
        let node: Node = serde_json::from_str(
            r#"{"id":"s","x":0,"y":0,"type":"sticker","backgroundImage":"data:image/png;base64,AAAA"}"#,
        )
        .unwrap();
        match node.kind {
            NodeKind::Sticker { background_image } => {
                assert_eq!(background_image.as_deref(), Some("data:image/png;base64,AAAA"))
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn connection_style_flattens_into_connection() {
        let c = Connection::new("c1", "a", "b");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["from"], "a");
        assert_eq!(json["route"], "curved");
        assert_eq!(json["endMarker"], "arrow");
    }
}
