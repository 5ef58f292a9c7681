use eframe::egui;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use innolab::editor::Cursor;
use innolab::render;
use innolab::settings::AppSettings;
use innolab::store::FileStore;
use innolab::templates::DiagramType;
use innolab::{InputEvent, Key, Modifiers, Response};

use super::command_palette::{CommandContext, CommandId, CommandPalette};
use super::paint::{self, Transform};
use super::{InnoLabApp, help, panels};

impl eframe::App for InnoLabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        self.handle_shortcuts(ctx);

        let mut command = self.top_bar(ctx);

        egui::SidePanel::left("tool_panel")
            .resizable(false)
            .default_width(120.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    panels::tool_strip(ui, &mut self.editor);
                });
            });

        egui::SidePanel::right("right_panel")
            .default_width(250.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    panels::properties_panel(ui, &mut self.editor, &mut self.style_draft);
                });
            });

        self.status_bar(ctx);

        if let Some(cmd) = self.canvas(ctx) {
            command = Some(cmd);
        }

        let cx = CommandContext {
            selected_nodes: self.editor.selection().node_count(),
            has_connection: self.editor.selection().connection().is_some(),
            has_undo: self.editor.can_undo(),
            has_redo: self.editor.can_redo(),
        };
        if let Some(cmd) = self.command_palette.ui(ctx, cx) {
            command = Some(cmd);
        }
        if let Some(cmd) = command {
            CommandPalette::execute(self, ctx, cmd);
        }

        self.open_dialog_window(ctx);
        self.settings_window(ctx);
        help::draw_help_window(ctx, &mut self.show_help);

        self.collect_notices(now);
        self.draw_toasts(ctx);
        if !self.toasts.is_empty() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}

fn modifiers(m: egui::Modifiers) -> Modifiers {
    Modifiers {
        shift: m.shift,
        command: m.command,
        alt: m.alt,
    }
}

fn map_key(key: egui::Key) -> Option<Key> {
    use egui::Key as K;
    Some(match key {
        K::Space => Key::Space,
        K::Enter => Key::Enter,
        K::Escape => Key::Escape,
        K::Backspace => Key::Backspace,
        K::Delete => Key::Delete,
        K::ArrowLeft => Key::ArrowLeft,
        K::ArrowRight => Key::ArrowRight,
        K::ArrowUp => Key::ArrowUp,
        K::ArrowDown => Key::ArrowDown,
        K::OpenBracket => Key::OpenBracket,
        K::CloseBracket => Key::CloseBracket,
        other => {
            let mut chars = other.name().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() => Key::Char(c.to_ascii_lowercase()),
                _ => return None,
            }
        }
    })
}

fn cursor_icon(cursor: Cursor) -> egui::CursorIcon {
    match cursor {
        Cursor::Default => egui::CursorIcon::Default,
        Cursor::Grab => egui::CursorIcon::Grab,
        Cursor::Grabbing => egui::CursorIcon::Grabbing,
        Cursor::Crosshair => egui::CursorIcon::Crosshair,
        Cursor::Move => egui::CursorIcon::Move,
        Cursor::ResizeNwSe => egui::CursorIcon::ResizeNwSe,
        Cursor::ResizeNeSw => egui::CursorIcon::ResizeNeSw,
        Cursor::Text => egui::CursorIcon::Text,
    }
}

impl InnoLabApp {
    fn overlay_open(&self) -> bool {
        self.command_palette.open || self.open_dialog.open || self.settings_draft.is_some()
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if self.editor.text_edit().is_some() || ctx.wants_keyboard_input() {
            return;
        }
        let mut command = None;
        let mut toggle_help = false;
        ctx.input_mut(|i| {
            if !self.command_palette.open
                && (i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::P)
                    || i.consume_key(egui::Modifiers::COMMAND, egui::Key::K))
            {
                self.command_palette.open("");
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::S) {
                command = Some(CommandId::Save);
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::O) {
                command = Some(CommandId::Open);
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::E) {
                command = Some(CommandId::Export);
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                toggle_help = true;
            }
        });
        if toggle_help {
            self.show_help = !self.show_help;
        }
        if let Some(cmd) = command {
            CommandPalette::execute(self, ctx, cmd);
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) -> Option<CommandId> {
        let mut command = None;
        let mut run = |ui: &mut egui::Ui, enabled: bool, label: &str, id: CommandId| {
            if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                command = Some(id);
                ui.close_menu();
            }
        };
        let has_nodes = self.editor.selection().node_count() > 0;
        let has_selection = !self.editor.selection().is_empty();
        let group_ready = self.editor.selection().node_count() >= 2;
        let (can_undo, can_redo) = (self.editor.can_undo(), self.editor.can_redo());
        let lasso = self.editor.settings().lasso_selection;
        let mut open_settings = false;
        let mut open_palette = false;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    ui.menu_button("New", |ui| {
                        for diagram_type in DiagramType::ALL {
                            run(ui, true, diagram_type.name(), CommandId::NewDiagram(diagram_type));
                        }
                    });
                    ui.separator();
                    run(ui, true, "Save (⌘S)", CommandId::Save);
                    run(ui, true, "Open… (⌘O)", CommandId::Open);
                    ui.separator();
                    run(ui, true, "Save as JSON…", CommandId::SaveJson);
                    run(ui, true, "Open JSON…", CommandId::LoadJson);
                    ui.separator();
                    run(ui, true, "Export image (⌘E)", CommandId::Export);
                    run(ui, true, "Export as…", CommandId::ExportDialog);
                    ui.separator();
                    if ui.button("Settings…").clicked() {
                        open_settings = true;
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Edit", |ui| {
                    run(ui, can_undo, "Undo (⌘Z)", CommandId::Undo);
                    run(ui, can_redo, "Redo (⌘⇧Z)", CommandId::Redo);
                    ui.separator();
                    run(ui, has_nodes, "Duplicate (⌘D)", CommandId::Duplicate);
                    run(ui, has_selection, "Delete (⌫)", CommandId::Delete);
                    run(ui, true, "Select all (⌘A)", CommandId::SelectAll);
                    ui.separator();
                    run(ui, group_ready, "Group (⌘G)", CommandId::Group);
                    run(ui, has_nodes, "Ungroup (⌘⇧G)", CommandId::Ungroup);
                    ui.separator();
                    run(ui, has_nodes, "Bring to front (⌘])", CommandId::BringFront);
                    run(ui, has_nodes, "Send to back (⌘[)", CommandId::SendBack);
                    run(ui, has_nodes, "Move up (])", CommandId::LayerUp);
                    run(ui, has_nodes, "Move down ([)", CommandId::LayerDown);
                    ui.separator();
                    run(ui, has_nodes, "Lock", CommandId::Lock);
                    run(ui, has_nodes, "Unlock", CommandId::Unlock);
                    run(ui, has_nodes, "Hide", CommandId::Hide);
                    run(ui, true, "Show all", CommandId::ShowAll);
                    ui.separator();
                    run(ui, true, "Remove dangling connections", CommandId::PruneConnections);
                });
                ui.menu_button("View", |ui| {
                    run(ui, true, "Zoom in", CommandId::ZoomIn);
                    run(ui, true, "Zoom out", CommandId::ZoomOut);
                    run(ui, true, "Reset zoom", CommandId::ZoomReset);
                    run(ui, true, "Zoom to fit", CommandId::ZoomFit);
                    ui.separator();
                    let label = if lasso { "✔ Lasso selection" } else { "Lasso selection" };
                    run(ui, true, label, CommandId::ToggleLasso);
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("Command palette (⌘K)").clicked() {
                        open_palette = true;
                        ui.close_menu();
                    }
                    if ui.button("Shortcuts (F1)").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                });
            });
        });

        if open_settings {
            self.settings_draft = Some(self.settings.clone());
        }
        if open_palette {
            self.command_palette.open("");
        }
        command
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let scene = self.editor.scene();
                ui.label(format!("Zoom: {:.0}%", self.editor.view().zoom * 100.0));
                ui.separator();
                ui.label(format!(
                    "Nodes: {}  Connections: {}  Paths: {}",
                    scene.nodes.len(),
                    scene.connections.len(),
                    scene.paths.len()
                ));
                ui.separator();
                let selection = self.editor.selection();
                match selection.connection() {
                    Some(id) => ui.label(format!("Selected: {id}")),
                    None => ui.label(format!("Selected: {}", selection.node_count())),
                };
                ui.separator();
                ui.label(format!("Tool: {}", self.editor.tool().name()));
                ui.separator();
                ui.label(format!(
                    "{} · {}",
                    self.editor.name(),
                    self.editor.diagram_type().name()
                ));
                ui.separator();
                let history = self.editor.history();
                ui.label(format!("History: {}/{}", history.index() + 1, history.len()));
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });
    }

    /// Draws the canvas and feeds it the frame's input. Returns a command
    /// picked from the context menu.
    fn canvas(&mut self, ctx: &egui::Context) -> Option<CommandId> {
        let mut command = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                self.canvas_size = rect.size();

                let outcome = self.feed_input(ctx, rect, &response);
                if outcome.needs_repaint() {
                    ctx.request_repaint();
                }

                let painter = ui.painter_at(rect);
                let view = self.editor.view();
                paint::draw_background(&painter, rect, &view);
                let list = render::build_display_list(&self.editor.render_input());
                let tf = Transform {
                    origin: rect.min,
                    view,
                };
                if paint::draw_display_list(&painter, tf, &list, &mut self.textures) {
                    ctx.request_repaint();
                }

                if response.hovered() || self.editor.is_busy() {
                    ctx.set_cursor_icon(cursor_icon(self.editor.cursor()));
                }

                let has_nodes = self.editor.selection().node_count() > 0;
                let single = self.editor.selection().single_node().map(str::to_string);
                response.context_menu(|ui| {
                    let mut item = |ui: &mut egui::Ui, enabled: bool, label: &str, id: CommandId| {
                        if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                            command = Some(id);
                            ui.close();
                        }
                    };
                    if let Some(id) = &single {
                        if ui.button("Edit text").clicked() {
                            self.editor.begin_text_edit(id);
                            ui.close();
                        }
                    }
                    item(ui, has_nodes, "Duplicate", CommandId::Duplicate);
                    item(ui, !self.editor.selection().is_empty(), "Delete", CommandId::Delete);
                    ui.separator();
                    item(ui, has_nodes, "Bring to front", CommandId::BringFront);
                    item(ui, has_nodes, "Send to back", CommandId::SendBack);
                    item(ui, has_nodes, "Move up", CommandId::LayerUp);
                    item(ui, has_nodes, "Move down", CommandId::LayerDown);
                    ui.separator();
                    item(ui, self.editor.selection().node_count() >= 2, "Group", CommandId::Group);
                    item(ui, has_nodes, "Ungroup", CommandId::Ungroup);
                    ui.separator();
                    item(ui, has_nodes, "Lock", CommandId::Lock);
                    item(ui, has_nodes, "Unlock", CommandId::Unlock);
                    item(ui, has_nodes, "Hide", CommandId::Hide);
                    item(ui, true, "Show all", CommandId::ShowAll);
                });
            });
        command
    }

    /// Translates this frame's egui events into editor input in canvas-local
    /// coordinates.
    fn feed_input(&mut self, ctx: &egui::Context, rect: egui::Rect, response: &egui::Response) -> Response {
        let local = |p: egui::Pos2| (p - rect.min).to_pos2();
        let accepts_keys = !ctx.wants_keyboard_input() && !self.overlay_open();
        let hovered = response.hovered();
        let events = ctx.input(|i| i.events.clone());
        let mut outcome = Response::Ignored;

        for event in events {
            let input = match event {
                egui::Event::PointerMoved(pos) if hovered || self.pointer_captured => {
                    let m = ctx.input(|i| i.modifiers);
                    Some(InputEvent::PointerMove {
                        pos: local(pos),
                        modifiers: modifiers(m),
                    })
                }
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: true,
                    modifiers: m,
                } if hovered && !self.overlay_open() => {
                    self.pointer_captured = true;
                    Some(InputEvent::PointerDown {
                        pos: local(pos),
                        modifiers: modifiers(m),
                    })
                }
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed: false,
                    modifiers: m,
                } if self.pointer_captured => {
                    self.pointer_captured = false;
                    Some(InputEvent::PointerUp {
                        pos: local(pos),
                        modifiers: modifiers(m),
                    })
                }
                egui::Event::Key {
                    key,
                    pressed,
                    modifiers: m,
                    ..
                } if accepts_keys => map_key(key).map(|key| {
                    if pressed {
                        InputEvent::KeyDown {
                            key,
                            modifiers: modifiers(m),
                        }
                    } else {
                        InputEvent::KeyUp { key }
                    }
                }),
                egui::Event::Text(text) if accepts_keys => Some(InputEvent::Text(text)),
                _ => None,
            };
            if let Some(input) = input {
                outcome = outcome.max(self.editor.handle(input));
            }
        }

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                outcome = outcome.max(self.editor.handle(InputEvent::DoubleClick { pos: local(pos) }));
            }
        }

        if hovered {
            let (scroll, zoom, hover) =
                ctx.input(|i| (i.raw_scroll_delta, i.zoom_delta(), i.pointer.hover_pos()));
            if let Some(pos) = hover {
                // Pinch and ctrl+scroll arrive as zoom; plain scroll as wheel.
                if (zoom - 1.0).abs() > f32::EPSILON {
                    self.editor.zoom_by(zoom, local(pos));
                    outcome = outcome.max(Response::Changed);
                } else if scroll.y.abs() > 0.0 {
                    outcome = outcome.max(self.editor.handle(InputEvent::Wheel {
                        pos: local(pos),
                        delta: scroll,
                    }));
                }
            }
        }
        outcome
    }

    fn open_dialog_window(&mut self, ctx: &egui::Context) {
        if !self.open_dialog.open {
            return;
        }
        let mut open = true;
        let mut to_open = None;
        let mut to_delete = None;
        egui::Window::new("Open diagram")
            .open(&mut open)
            .collapsible(false)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.open_dialog.query)
                        .desired_width(f32::INFINITY)
                        .hint_text("Filter"),
                );
                ui.small(format!("Library: {}", self.store.dir().display()));
                ui.separator();
                let matcher = SkimMatcherV2::default();
                let query = self.open_dialog.query.trim();
                let mut names: Vec<(&String, i64)> = self
                    .open_dialog
                    .names
                    .iter()
                    .filter_map(|n| {
                        if query.is_empty() {
                            Some((n, 0))
                        } else {
                            matcher.fuzzy_match(n, query).map(|s| (n, s))
                        }
                    })
                    .collect();
                names.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                if names.is_empty() {
                    ui.label("No saved diagrams.");
                }
                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    for (name, _) in names {
                        ui.horizontal(|ui| {
                            if ui.button(name.as_str()).clicked() {
                                to_open = Some(name.clone());
                            }
                            if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                to_delete = Some(name.clone());
                            }
                        });
                    }
                });
            });
        if let Some(name) = to_delete {
            self.delete_from_store(&name);
        }
        if let Some(name) = to_open {
            self.open_from_store(&name);
        }
        if !open {
            self.open_dialog.open = false;
        }
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let Some(draft) = self.settings_draft.as_mut() else {
            return;
        };
        let mut open = true;
        let mut apply = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .default_width(360.0)
            .show(ctx, |ui| {
                settings_form(ui, draft);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        apply = true;
                    }
                    if ui.button("Defaults").clicked() {
                        *draft = AppSettings::default();
                    }
                });
            });
        if apply {
            if let Some(settings) = self.settings_draft.take() {
                self.store = FileStore::new(&settings.storage_dir);
                self.editor.set_settings(settings.editor.clone());
                self.settings = settings;
                self.persist_settings();
                self.status = Some("Settings saved".to_string());
            }
        } else if !open {
            self.settings_draft = None;
        }
    }
}

fn settings_form(ui: &mut egui::Ui, s: &mut AppSettings) {
    ui.label("Library folder");
    ui.text_edit_singleline(&mut s.storage_dir);
    ui.label("Export path");
    ui.text_edit_singleline(&mut s.export_path);
    ui.add(egui::Slider::new(&mut s.export_scale, 0.5..=4.0).text("Export scale"));
    ui.checkbox(&mut s.prune_dangling_on_save, "Remove dangling connections on save");
    ui.horizontal(|ui| {
        ui.label("New diagrams:");
        egui::ComboBox::from_id_salt("default_diagram_type")
            .selected_text(s.default_diagram_type.name())
            .show_ui(ui, |ui| {
                for t in DiagramType::ALL {
                    ui.selectable_value(&mut s.default_diagram_type, t, t.name());
                }
            });
    });

    ui.separator();
    let e = &mut s.editor;
    ui.add(egui::Slider::new(&mut e.zoom_min, 0.05..=1.0).text("Min zoom"));
    ui.add(egui::Slider::new(&mut e.zoom_max, 1.0..=8.0).text("Max zoom"));
    ui.add(egui::Slider::new(&mut e.history_limit, 1..=500).text("Undo steps"));
    ui.add(egui::Slider::new(&mut e.drag_threshold, 0.0..=10.0).text("Drag threshold"));
    ui.add(egui::Slider::new(&mut e.nudge_step, 1.0..=20.0).text("Nudge"));
    ui.add(egui::Slider::new(&mut e.nudge_step_fast, 1.0..=100.0).text("Nudge (Shift)"));
    ui.checkbox(&mut e.lasso_selection, "Lasso selection");
}
