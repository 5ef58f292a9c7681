use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help & Shortcuts")
        .open(open)
        .resizable(true)
        .default_width(560.0)
        .default_height(480.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();

                ui.label("General");
                help_row(ui, "⌘K / ⌘⇧P", "Open command palette");
                help_row(ui, "⌘S", "Save to the diagram library");
                help_row(ui, "⌘O", "Open from the diagram library");
                help_row(ui, "⌘E", "Export image");
                help_row(ui, "⌘Z", "Undo");
                help_row(ui, "⌘⇧Z / ⌘Y", "Redo");
                help_row(ui, "Escape", "Cancel gesture, clear selection, Select tool");
                help_row(ui, "F1", "Toggle this window");

                ui.add_space(10.0);
                ui.label("Selection & Editing");
                help_row(ui, "⌘A", "Select all");
                help_row(ui, "⌘D", "Duplicate selection");
                help_row(ui, "⌘G / ⌘⇧G", "Group / ungroup");
                help_row(ui, "Delete / Backspace", "Delete selection");
                help_row(ui, "Arrow keys", "Nudge selection");
                help_row(ui, "Shift + Arrow keys", "Nudge selection faster");
                help_row(ui, "] / [", "Move one layer up / down");
                help_row(ui, "⌘] / ⌘[", "Bring to front / send to back");
                help_row(ui, "Shift + click", "Add to or remove from selection");
                help_row(ui, "Double-click", "Edit text inline");
                help_row(ui, "⌘Enter", "Finish editing text");

                ui.add_space(10.0);
                ui.label("Tools");
                help_row(ui, "V", "Select");
                help_row(ui, "T", "Text");
                help_row(ui, "S", "Sticker");
                help_row(ui, "Z", "Zone");
                help_row(ui, "R", "Rectangle");
                help_row(ui, "O", "Circle");
                help_row(ui, "C", "Connect two nodes");
                help_row(ui, "P", "Pen (highlighter)");

                ui.add_space(10.0);
                ui.label("Canvas");
                help_row(ui, "Space + drag", "Pan");
                help_row(ui, "Scroll / pinch", "Zoom about the pointer");
                help_row(ui, "Drag on empty space", "Box select (fully enclosed nodes)");
                help_row(ui, "Zone title or border", "Drag the zone; its interior box selects");

                ui.add_space(20.0);
                ui.heading("Templates");
                ui.separator();
                ui.label("File → New starts a mind map, SWOT, business model canvas,");
                ui.label("fishbone, table or flowchart. Switching is undoable.");

                ui.add_space(20.0);
                ui.heading("Settings");
                ui.separator();
                ui.label("Settings are read from ~/.config/innolab.toml or ./settings.toml:");
                ui.add_space(5.0);
                ui.code(
                    r##"storage_dir = "/home/me/diagrams"
export_scale = 2.0
prune_dangling_on_save = true
default_diagram_type = "mindmap"

[editor]
zoom_max = 3.0
history_limit = 50
lasso_selection = false"##,
                );
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [130.0, 16.0],
            egui::Label::new(egui::RichText::new(shortcut).monospace().strong()),
        );
        ui.label(description);
    });
}
