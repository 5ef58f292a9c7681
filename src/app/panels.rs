use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use eframe::egui;

use innolab::model::{
    BorderStyle, ConnectionStyle, FontFamily, FontStyle, FontWeight, LineStyle, Marker, NodeKind,
    NodeStyle, PenStyle, Rgba, Route, Shape, TextAlign, TextDecoration,
};
use innolab::{Editor, Selection, Tool};

pub(super) fn tool_button(ui: &mut egui::Ui, label: &str, tool: Tool, editor: &mut Editor) {
    let active = editor.tool() == tool;
    if ui
        .selectable_label(active, label)
        .on_hover_text(tool.name())
        .clicked()
    {
        editor.set_tool(tool);
    }
}

pub(super) fn tool_strip(ui: &mut egui::Ui, editor: &mut Editor) {
    ui.vertical_centered_justified(|ui| {
        tool_button(ui, "Select (V)", Tool::Select, editor);
        tool_button(ui, "Text (T)", Tool::AddText, editor);
        tool_button(ui, "Sticker (S)", Tool::AddSticker, editor);
        tool_button(ui, "Zone (Z)", Tool::AddZone, editor);
        tool_button(ui, "Connect (C)", Tool::DrawConnection, editor);
        tool_button(ui, "Pen (P)", Tool::DrawFreehand, editor);
        ui.separator();
        ui.label("Shapes");
        for shape in Shape::ALL {
            tool_button(ui, shape.name(), Tool::AddShape(shape), editor);
        }
    });
}

fn color_row(ui: &mut egui::Ui, rgba: &mut Rgba) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        let presets = [
            Rgba::rgb(31, 41, 55),
            Rgba::rgb(220, 38, 38),
            Rgba::rgb(22, 163, 74),
            Rgba::rgb(37, 99, 235),
            Rgba::rgb(245, 158, 11),
            Rgba::rgb(147, 51, 234),
            Rgba::WHITE,
        ];
        for c in presets {
            if ui
                .add_sized([18.0, 18.0], egui::Button::new("").fill(c.to_color32()))
                .clicked()
            {
                *rgba = c.with_alpha(rgba.a);
                changed = true;
            }
        }
        let mut arr = [rgba.r, rgba.g, rgba.b, rgba.a];
        if ui.color_edit_button_srgba_unmultiplied(&mut arr).changed() {
            *rgba = Rgba::rgba(arr[0], arr[1], arr[2], arr[3]);
            changed = true;
        }
    });
    changed
}

fn enum_combo<T: Copy + PartialEq>(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    value: &mut T,
    options: &[(T, &str)],
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        let selected = options
            .iter()
            .find(|(v, _)| v == value)
            .map_or("", |(_, name)| *name);
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for (option, name) in options {
                    changed |= ui.selectable_value(value, *option, *name).changed();
                }
            });
    });
    changed
}

/// Slider edits stay local until the drag ends so one drag is one undo step.
fn slider_committed(resp: &egui::Response) -> bool {
    (resp.changed() && !resp.dragged()) || resp.drag_stopped()
}

const LINE_STYLES: [(LineStyle, &str); 3] = [
    (LineStyle::Solid, "Solid"),
    (LineStyle::Dashed, "Dashed"),
    (LineStyle::Dotted, "Dotted"),
];

const MARKERS: [(Marker, &str); 3] = [
    (Marker::None, "None"),
    (Marker::Arrow, "Arrow"),
    (Marker::Circle, "Circle"),
];

/// Working copies of the styles shown in the side panel.
#[derive(Default)]
pub(super) struct StyleDraft {
    loaded_for: Option<Selection>,
    dragging: bool,
    node: NodeStyle,
    connection: ConnectionStyle,
}

impl StyleDraft {
    fn sync(&mut self, editor: &Editor) {
        let selection = editor.selection();
        if self.dragging && self.loaded_for.as_ref() == Some(selection) {
            return;
        }
        match selection {
            Selection::Nodes(ids) => {
                let first = editor
                    .scene()
                    .nodes
                    .iter()
                    .find(|n| ids.contains(&n.id));
                if let Some(node) = first {
                    self.node = node.style.clone();
                }
            }
            Selection::Connection(id) => {
                if let Some(c) = editor.scene().connection(id) {
                    self.connection = c.style.clone();
                }
            }
            Selection::None => {}
        }
        self.loaded_for = Some(selection.clone());
    }
}

pub(super) fn properties_panel(ui: &mut egui::Ui, editor: &mut Editor, draft: &mut StyleDraft) {
    draft.sync(editor);
    draft.dragging = false;
    match editor.selection().clone() {
        Selection::Nodes(ids) => {
            ui.heading(if ids.len() == 1 {
                "Node".to_string()
            } else {
                format!("{} nodes", ids.len())
            });
            node_section(ui, editor, draft);
        }
        Selection::Connection(_) => {
            ui.heading("Connection");
            connection_section(ui, editor, draft);
        }
        Selection::None => {
            ui.heading("Defaults");
            defaults_section(ui, editor);
        }
    }
}

fn node_section(ui: &mut egui::Ui, editor: &mut Editor, draft: &mut StyleDraft) {
    let style = &mut draft.node;

    ui.label("Text");
    if color_row(ui, &mut style.text_color) {
        let c = style.text_color;
        editor.update_selected_nodes(|n| n.style.text_color = c);
    }

    let mut has_fill = style.fill.is_some();
    if ui.checkbox(&mut has_fill, "Fill").changed() {
        let fill = has_fill.then_some(Rgba::WHITE);
        style.fill = fill;
        editor.update_selected_nodes(|n| n.style.fill = fill);
    }
    if let Some(fill) = style.fill.as_mut() {
        if color_row(ui, fill) {
            let c = *fill;
            editor.update_selected_nodes(|n| n.style.fill = Some(c));
        }
    }

    ui.label("Border");
    if color_row(ui, &mut style.border_color) {
        let c = style.border_color;
        editor.update_selected_nodes(|n| n.style.border_color = c);
    }
    let resp = ui.add(egui::Slider::new(&mut style.border_width, 0.0..=12.0).text("Width"));
    draft.dragging |= resp.dragged();
    if slider_committed(&resp) {
        let w = style.border_width;
        editor.update_selected_nodes(|n| n.style.border_width = w);
    }
    if enum_combo(
        ui,
        "border_style",
        "Style:",
        &mut style.border_style,
        &[
            (BorderStyle::Solid, "Solid"),
            (BorderStyle::Dashed, "Dashed"),
            (BorderStyle::Dotted, "Dotted"),
            (BorderStyle::None, "None"),
        ],
    ) {
        let s = style.border_style;
        editor.update_selected_nodes(|n| n.style.border_style = s);
    }

    ui.separator();
    ui.label("Font");
    let families: Vec<(FontFamily, &str)> = FontFamily::ALL.iter().map(|f| (*f, f.label())).collect();
    if enum_combo(ui, "font_family", "Family:", &mut style.font_family, &families) {
        let f = style.font_family;
        editor.update_selected_nodes(|n| n.style.font_family = f);
    }
    let resp = ui.add(egui::Slider::new(&mut style.font_size, 8.0..=72.0).text("Size"));
    draft.dragging |= resp.dragged();
    if slider_committed(&resp) {
        let s = style.font_size;
        editor.update_selected_nodes(|n| n.style.font_size = s);
    }
    ui.horizontal(|ui| {
        let mut bold = style.font_weight == FontWeight::Bold;
        if ui.toggle_value(&mut bold, "B").changed() {
            let w = if bold { FontWeight::Bold } else { FontWeight::Normal };
            style.font_weight = w;
            editor.update_selected_nodes(|n| n.style.font_weight = w);
        }
        let mut italic = style.font_style == FontStyle::Italic;
        if ui.toggle_value(&mut italic, "I").changed() {
            let s = if italic { FontStyle::Italic } else { FontStyle::Normal };
            style.font_style = s;
            editor.update_selected_nodes(|n| n.style.font_style = s);
        }
        ui.separator();
        for (align, label) in [
            (TextAlign::Left, "Left"),
            (TextAlign::Center, "Center"),
            (TextAlign::Right, "Right"),
        ] {
            if ui.selectable_label(style.text_align == align, label).clicked() {
                style.text_align = align;
                editor.update_selected_nodes(|n| n.style.text_align = align);
            }
        }
    });
    if enum_combo(
        ui,
        "text_decoration",
        "Decoration:",
        &mut style.text_decoration,
        &[
            (TextDecoration::None, "None"),
            (TextDecoration::Underline, "Underline"),
            (TextDecoration::LineThrough, "Strikethrough"),
        ],
    ) {
        let d = style.text_decoration;
        editor.update_selected_nodes(|n| n.style.text_decoration = d);
    }

    let single = editor.selection().single_node().map(str::to_string);
    if let Some(node) = single.as_deref().and_then(|id| editor.scene().node(id)).cloned() {
        ui.separator();
        if let Some(mut shape) = node.kind.shape() {
            let shapes: Vec<(Shape, &str)> = Shape::ALL.iter().map(|s| (*s, s.name())).collect();
            if enum_combo(ui, "node_shape", "Shape:", &mut shape, &shapes) {
                editor.update_selected_nodes(|n| match &mut n.kind {
                    NodeKind::Generic { shape: s } | NodeKind::Root { shape: s } => *s = shape,
                    _ => {}
                });
            }
        }
        if let NodeKind::Sticker { background_image } = &node.kind {
            ui.horizontal(|ui| {
                if ui.button("Image…").clicked() {
                    if let Some(href) = pick_image_data_url() {
                        editor.update_selected_nodes(|n| {
                            if let NodeKind::Sticker { background_image } = &mut n.kind {
                                *background_image = Some(href.clone());
                            }
                        });
                    }
                }
                if background_image.is_some() && ui.button("Clear").clicked() {
                    editor.update_selected_nodes(|n| {
                        if let NodeKind::Sticker { background_image } = &mut n.kind {
                            *background_image = None;
                        }
                    });
                }
            });
        }
        ui.label(format!("{} · {}", node.kind.type_name(), node.id));
    }

    ui.separator();
    ui.horizontal(|ui| {
        let locked = editor
            .selection()
            .node_ids()
            .iter()
            .any(|id| editor.scene().node(id).is_some_and(|n| n.locked));
        if ui.selectable_label(locked, "Locked").clicked() {
            editor.set_locked(!locked);
        }
        if ui.button("Hide").clicked() {
            editor.hide_selection();
        }
        if ui.button("Delete").clicked() {
            editor.delete_selection();
        }
    });
}

fn pick_image_data_url() -> Option<String> {
    let path = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg"])
        .pick_file()?;
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "could not read image");
            return None;
        }
    };
    let mime = match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::Png) => "image/png",
        _ => {
            tracing::warn!(path = %path.display(), "unsupported image format");
            return None;
        }
    };
    Some(format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes)))
}

fn connection_section(ui: &mut egui::Ui, editor: &mut Editor, draft: &mut StyleDraft) {
    let mut style = draft.connection.clone();
    if connection_style_editor(ui, &mut style, &mut draft.dragging) {
        editor.update_selected_connection(|c| c.style = style.clone());
    }
    draft.connection = style;
    ui.separator();
    if ui.button("Delete").clicked() {
        editor.delete_selection();
    }
}

/// Returns true when an edit should be applied.
fn connection_style_editor(ui: &mut egui::Ui, style: &mut ConnectionStyle, dragging: &mut bool) -> bool {
    let mut changed = false;
    ui.label("Line");
    changed |= color_row(ui, &mut style.color);
    let resp = ui.add(egui::Slider::new(&mut style.thickness, 1.0..=10.0).text("Thickness"));
    *dragging |= resp.dragged();
    changed |= slider_committed(&resp);
    changed |= enum_combo(ui, "conn_dash", "Style:", &mut style.dash, &LINE_STYLES);
    changed |= enum_combo(
        ui,
        "conn_route",
        "Route:",
        &mut style.route,
        &[
            (Route::Straight, "Straight"),
            (Route::Curved, "Curved"),
            (Route::Step, "Step"),
        ],
    );
    changed |= enum_combo(ui, "conn_start", "Start:", &mut style.start_marker, &MARKERS);
    changed |= enum_combo(ui, "conn_end", "End:", &mut style.end_marker, &MARKERS);
    changed |= ui.checkbox(&mut style.animated, "Animated").changed();
    changed
}

fn defaults_section(ui: &mut egui::Ui, editor: &mut Editor) {
    ui.label("New connections");
    let mut style = editor.connection_style().clone();
    let mut dragging = false;
    connection_style_editor(ui, &mut style, &mut dragging);
    if &style != editor.connection_style() {
        editor.set_connection_style(style);
    }

    ui.separator();
    ui.label("Pen");
    let mut pen: PenStyle = editor.pen().clone();
    color_row(ui, &mut pen.color);
    ui.add(egui::Slider::new(&mut pen.thickness, 1.0..=40.0).text("Thickness"));
    ui.add(egui::Slider::new(&mut pen.opacity, 0.05..=1.0).text("Opacity"));
    if &pen != editor.pen() {
        editor.set_pen(pen);
    }

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Name:");
        let mut name = editor.name().to_string();
        if ui.text_edit_singleline(&mut name).changed() {
            editor.set_name(name);
        }
    });
    ui.label(format!("Diagram: {}", editor.diagram_type().name()));
}
