use eframe::egui;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use innolab::model::Shape;
use innolab::templates::DiagramType;
use innolab::Tool;

use super::InnoLabApp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum CommandId {
    SetTool(Tool),
    NewDiagram(DiagramType),
    Undo,
    Redo,
    Duplicate,
    Delete,
    SelectAll,
    Group,
    Ungroup,
    BringFront,
    SendBack,
    LayerUp,
    LayerDown,
    Lock,
    Unlock,
    Hide,
    ShowAll,
    PruneConnections,
    Save,
    Open,
    SaveJson,
    LoadJson,
    Export,
    ExportDialog,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ZoomFit,
    ToggleLasso,
}

pub(super) struct CommandSpec {
    pub id: CommandId,
    pub name: &'static str,
    pub search: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { id: CommandId::SetTool(Tool::Select), name: "Tool: Select", search: "select tool v" },
    CommandSpec { id: CommandId::SetTool(Tool::AddText), name: "Tool: Text", search: "text tool t" },
    CommandSpec { id: CommandId::SetTool(Tool::AddSticker), name: "Tool: Sticker", search: "sticker note post-it tool s" },
    CommandSpec { id: CommandId::SetTool(Tool::AddZone), name: "Tool: Zone", search: "zone area region tool z" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Rect)), name: "Tool: Rectangle", search: "rectangle rect shape tool r" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Circle)), name: "Tool: Circle", search: "circle ellipse oval shape tool o" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Diamond)), name: "Tool: Diamond", search: "diamond decision shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Pill)), name: "Tool: Pill", search: "pill terminator rounded shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Triangle)), name: "Tool: Triangle", search: "triangle shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Hexagon)), name: "Tool: Hexagon", search: "hexagon shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Star)), name: "Tool: Star", search: "star shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Cloud)), name: "Tool: Cloud", search: "cloud shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Cylinder)), name: "Tool: Cylinder", search: "cylinder database shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Document)), name: "Tool: Document", search: "document page shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::AddShape(Shape::Parallelogram)), name: "Tool: Parallelogram", search: "parallelogram input output shape tool" },
    CommandSpec { id: CommandId::SetTool(Tool::DrawConnection), name: "Tool: Connect", search: "connect connection arrow edge tool c" },
    CommandSpec { id: CommandId::SetTool(Tool::DrawFreehand), name: "Tool: Pen", search: "pen freehand highlighter draw tool p" },
    CommandSpec { id: CommandId::NewDiagram(DiagramType::Freeform), name: "New: Freeform", search: "new blank freeform diagram" },
    CommandSpec { id: CommandId::NewDiagram(DiagramType::Mindmap), name: "New: Mind map", search: "new mindmap mind map template" },
    CommandSpec { id: CommandId::NewDiagram(DiagramType::Swot), name: "New: SWOT", search: "new swot strengths weaknesses template" },
    CommandSpec { id: CommandId::NewDiagram(DiagramType::Canvas), name: "New: Business model canvas", search: "new canvas business model bmc template" },
    CommandSpec { id: CommandId::NewDiagram(DiagramType::Fishbone), name: "New: Fishbone", search: "new fishbone ishikawa cause effect template" },
    CommandSpec { id: CommandId::NewDiagram(DiagramType::Table), name: "New: Table", search: "new table comparison template" },
    CommandSpec { id: CommandId::NewDiagram(DiagramType::Flowchart), name: "New: Flowchart", search: "new flowchart process template" },
    CommandSpec { id: CommandId::Undo, name: "Edit: Undo", search: "undo" },
    CommandSpec { id: CommandId::Redo, name: "Edit: Redo", search: "redo" },
    CommandSpec { id: CommandId::Duplicate, name: "Edit: Duplicate", search: "duplicate clone copy" },
    CommandSpec { id: CommandId::Delete, name: "Edit: Delete", search: "delete remove" },
    CommandSpec { id: CommandId::SelectAll, name: "Edit: Select all", search: "select all" },
    CommandSpec { id: CommandId::Lock, name: "Edit: Lock", search: "lock pin freeze" },
    CommandSpec { id: CommandId::Unlock, name: "Edit: Unlock", search: "unlock" },
    CommandSpec { id: CommandId::Hide, name: "Edit: Hide", search: "hide" },
    CommandSpec { id: CommandId::ShowAll, name: "Edit: Show all", search: "show all unhide" },
    CommandSpec { id: CommandId::PruneConnections, name: "Edit: Remove dangling connections", search: "prune dangling connections cleanup" },
    CommandSpec { id: CommandId::Group, name: "Group: Group", search: "group" },
    CommandSpec { id: CommandId::Ungroup, name: "Group: Ungroup", search: "ungroup" },
    CommandSpec { id: CommandId::BringFront, name: "Layer: Bring to front", search: "front bring layer" },
    CommandSpec { id: CommandId::SendBack, name: "Layer: Send to back", search: "back send layer" },
    CommandSpec { id: CommandId::LayerUp, name: "Layer: Move up", search: "layer up move forward" },
    CommandSpec { id: CommandId::LayerDown, name: "Layer: Move down", search: "layer down move backward" },
    CommandSpec { id: CommandId::Save, name: "File: Save", search: "save store" },
    CommandSpec { id: CommandId::Open, name: "File: Open saved…", search: "open load saved list" },
    CommandSpec { id: CommandId::SaveJson, name: "File: Save as JSON…", search: "save as file json" },
    CommandSpec { id: CommandId::LoadJson, name: "File: Open JSON…", search: "open load file json" },
    CommandSpec { id: CommandId::Export, name: "File: Export image", search: "export png image" },
    CommandSpec { id: CommandId::ExportDialog, name: "File: Export as…", search: "export as png svg image" },
    CommandSpec { id: CommandId::ZoomIn, name: "View: Zoom in", search: "zoom in" },
    CommandSpec { id: CommandId::ZoomOut, name: "View: Zoom out", search: "zoom out" },
    CommandSpec { id: CommandId::ZoomReset, name: "View: Reset zoom", search: "zoom reset 100" },
    CommandSpec { id: CommandId::ZoomFit, name: "View: Zoom to fit", search: "zoom fit all" },
    CommandSpec { id: CommandId::ToggleLasso, name: "View: Toggle lasso selection", search: "lasso freeform selection toggle" },
];

#[derive(Default)]
pub(super) struct CommandPalette {
    pub open: bool,
    pub query: String,
    pub selected: usize,
    request_focus: bool,
}

#[derive(Clone, Copy)]
pub(super) struct CommandContext {
    pub selected_nodes: usize,
    pub has_connection: bool,
    pub has_undo: bool,
    pub has_redo: bool,
}

impl CommandPalette {
    pub fn open(&mut self, query: impl Into<String>) {
        self.open = true;
        self.query = query.into();
        self.selected = 0;
        self.request_focus = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.selected = 0;
        self.request_focus = false;
    }

    fn is_enabled(cx: CommandContext, id: CommandId) -> bool {
        match id {
            CommandId::Undo => cx.has_undo,
            CommandId::Redo => cx.has_redo,
            CommandId::Delete => cx.selected_nodes > 0 || cx.has_connection,
            CommandId::Duplicate
            | CommandId::Ungroup
            | CommandId::Lock
            | CommandId::Unlock
            | CommandId::Hide
            | CommandId::BringFront
            | CommandId::SendBack
            | CommandId::LayerUp
            | CommandId::LayerDown => cx.selected_nodes > 0,
            CommandId::Group => cx.selected_nodes >= 2,
            _ => true,
        }
    }

    pub(super) fn execute(app: &mut InnoLabApp, ctx: &egui::Context, id: CommandId) {
        let editor = &mut app.editor;
        let center = (app.canvas_size * 0.5).to_pos2();
        match id {
            CommandId::SetTool(tool) => editor.set_tool(tool),
            CommandId::NewDiagram(diagram_type) => app.new_diagram(diagram_type),
            CommandId::Undo => {
                editor.undo();
            }
            CommandId::Redo => {
                editor.redo();
            }
            CommandId::Duplicate => {
                editor.duplicate_selection();
            }
            CommandId::Delete => {
                editor.delete_selection();
            }
            CommandId::SelectAll => {
                editor.select_all();
            }
            CommandId::Group => {
                editor.group_selection();
            }
            CommandId::Ungroup => {
                editor.ungroup_selection();
            }
            CommandId::BringFront => {
                editor.bring_to_front();
            }
            CommandId::SendBack => {
                editor.send_to_back();
            }
            CommandId::LayerUp => {
                editor.layer_up();
            }
            CommandId::LayerDown => {
                editor.layer_down();
            }
            CommandId::Lock => {
                editor.set_locked(true);
            }
            CommandId::Unlock => {
                editor.set_locked(false);
            }
            CommandId::Hide => {
                editor.hide_selection();
            }
            CommandId::ShowAll => {
                editor.show_all();
            }
            CommandId::PruneConnections => {
                let removed = editor.prune_dangling_connections();
                app.status = Some(format!("Removed {removed} dangling connection(s)"));
            }
            CommandId::Save => app.save(),
            CommandId::Open => app.show_open_dialog(),
            CommandId::SaveJson => app.save_json_dialog(),
            CommandId::LoadJson => app.open_json_dialog(),
            CommandId::Export => app.export_default(),
            CommandId::ExportDialog => app.export_dialog(),
            CommandId::ZoomIn => editor.zoom_by(1.25, center),
            CommandId::ZoomOut => editor.zoom_by(0.8, center),
            CommandId::ZoomReset => editor.reset_view(),
            CommandId::ZoomFit => editor.zoom_to_fit(app.canvas_size),
            CommandId::ToggleLasso => {
                let mut settings = editor.settings().clone();
                settings.lasso_selection = !settings.lasso_selection;
                editor.set_settings(settings);
                app.persist_settings();
            }
        }
        ctx.request_repaint();
    }

    fn filtered(&self) -> Vec<(&'static CommandSpec, i64)> {
        let matcher = SkimMatcherV2::default();
        let q = self.query.trim();
        if q.is_empty() {
            return COMMANDS.iter().map(|c| (c, 0)).collect();
        }
        let mut out = Vec::new();
        for c in COMMANDS {
            let best = [c.search, c.name]
                .iter()
                .filter_map(|s| matcher.fuzzy_match(s, q))
                .max();
            if let Some(score) = best {
                out.push((c, score));
            }
        }
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(b.0.name)));
        out
    }

    pub fn ui(&mut self, ctx: &egui::Context, cx: CommandContext) -> Option<CommandId> {
        if !self.open {
            return None;
        }
        let matches = self.filtered();
        if self.selected >= matches.len() {
            self.selected = matches.len().saturating_sub(1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.close();
            return None;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowDown)) && !matches.is_empty() {
            self.selected = (self.selected + 1).min(matches.len() - 1);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowUp)) && !matches.is_empty() {
            self.selected = self.selected.saturating_sub(1);
        }
        let mut run_selected = ctx.input(|i| i.key_pressed(egui::Key::Enter));

        let screen = ctx.content_rect();
        let width = 560.0;
        let height = 320.0;
        let pos = egui::pos2(screen.center().x - width * 0.5, screen.top() + 48.0);
        egui::Area::new(egui::Id::new("command_palette"))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let frame = egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 240))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(59, 130, 246)))
                    .inner_margin(10.0)
                    .corner_radius(egui::CornerRadius::same(8));
                frame.show(ui, |ui| {
                    ui.set_min_size(egui::vec2(width, height));
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut self.query)
                            .desired_width(f32::INFINITY)
                            .hint_text("Search commands"),
                    );
                    if self.request_focus {
                        resp.request_focus();
                        self.request_focus = false;
                    }
                    ui.separator();
                    egui::ScrollArea::vertical().max_height(height - 64.0).show(ui, |ui| {
                        for (idx, (spec, _score)) in matches.iter().take(24).enumerate() {
                            let enabled = CommandPalette::is_enabled(cx, spec.id);
                            let selected = idx == self.selected;
                            let resp = ui.add_enabled(enabled, egui::Button::new(spec.name).selected(selected));
                            if selected {
                                resp.scroll_to_me(None);
                            }
                            if resp.clicked() {
                                self.selected = idx;
                                run_selected = true;
                            }
                        }
                    });
                });
            });

        if run_selected {
            if let Some((spec, _)) = matches.get(self.selected) {
                if CommandPalette::is_enabled(cx, spec.id) {
                    let cmd = spec.id;
                    self.close();
                    return Some(cmd);
                }
            }
        }
        None
    }
}
