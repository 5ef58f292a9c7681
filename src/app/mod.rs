use eframe::egui;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use innolab::notify::{Notice, NoticeLevel};
use innolab::settings::{self, AppSettings};
use innolab::store::{self, FileStore, SceneStore};
use innolab::templates::DiagramType;
use innolab::Editor;

mod command_palette;
mod help;
mod paint;
mod panels;
mod textures;
mod update;

const TOAST_SECONDS: f64 = 4.0;

struct Toast {
    notice: Notice,
    expires_at: f64,
}

/// Browser for diagrams in the local store.
#[derive(Default)]
struct OpenDialog {
    open: bool,
    query: String,
    names: Vec<String>,
}

pub struct InnoLabApp {
    editor: Editor,
    settings: AppSettings,
    settings_path: PathBuf,
    store: FileStore,
    command_palette: command_palette::CommandPalette,
    open_dialog: OpenDialog,
    textures: textures::TextureCache,
    toasts: Vec<Toast>,
    status: Option<String>,
    style_draft: panels::StyleDraft,
    settings_draft: Option<AppSettings>,
    show_help: bool,
    /// Canvas size from the last frame, for zoom-to-fit.
    canvas_size: egui::Vec2,
    /// A primary press started on the canvas and has not been released.
    pointer_captured: bool,
}

impl InnoLabApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings_path = settings::config_path().unwrap_or_else(|| PathBuf::from("settings.toml"));
        let settings = match settings::load_settings(&settings_path) {
            Ok(s) => s,
            Err(e) => {
                if settings_path.exists() {
                    warn!(error = %e, path = %settings_path.display(), "ignoring unreadable settings");
                }
                AppSettings::default()
            }
        };

        let mut editor = Editor::new(settings.editor.clone());
        if settings.default_diagram_type != DiagramType::Freeform {
            editor.switch_diagram_type(settings.default_diagram_type);
        }
        editor.set_name(Self::generate_default_name());

        let store = FileStore::new(&settings.storage_dir);
        info!(store = %store.dir().display(), "editor ready");

        Self {
            editor,
            settings,
            settings_path,
            store,
            command_palette: command_palette::CommandPalette::default(),
            open_dialog: OpenDialog::default(),
            textures: textures::TextureCache::default(),
            toasts: Vec::new(),
            status: None,
            style_draft: panels::StyleDraft::default(),
            settings_draft: None,
            show_help: false,
            canvas_size: egui::Vec2::ZERO,
            pointer_captured: false,
        }
    }

    fn generate_default_name() -> String {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let days = secs / 86400;
        let year = 1970 + days / 365;
        let remaining_days = days % 365;
        let month = remaining_days / 30 + 1;
        let day = remaining_days % 30 + 1;
        let day_secs = secs % 86400;
        format!(
            "diagram-{:04}-{:02}-{:02}-{:02}{:02}",
            year,
            month,
            day,
            day_secs / 3600,
            (day_secs % 3600) / 60
        )
    }

    fn persist_settings(&mut self) {
        self.settings.editor = self.editor.settings().clone();
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            warn!(error = %e, "could not write settings");
            self.status = Some(format!("Settings not saved: {e}"));
        }
    }

    fn new_diagram(&mut self, diagram_type: DiagramType) {
        self.editor.switch_diagram_type(diagram_type);
        self.editor.set_name(Self::generate_default_name());
    }

    fn save(&mut self) {
        self.editor.save(&self.store, self.settings.prune_dangling_on_save);
    }

    fn show_open_dialog(&mut self) {
        match self.store.list() {
            Ok(names) => self.open_dialog.names = names,
            Err(e) => {
                warn!(error = %e, "could not list saved diagrams");
                self.open_dialog.names.clear();
            }
        }
        self.open_dialog.query.clear();
        self.open_dialog.open = true;
    }

    fn open_from_store(&mut self, name: &str) {
        if self.editor.load(&self.store, name) {
            self.open_dialog.open = false;
        }
    }

    fn delete_from_store(&mut self, name: &str) {
        match self.store.delete(name) {
            Ok(()) => {
                self.open_dialog.names.retain(|n| n != name);
                self.status = Some(format!("Deleted \"{name}\""));
            }
            Err(e) => self.status = Some(format!("Delete failed: {e}")),
        }
    }

    fn save_json_dialog(&mut self) {
        let default_name = format!("{}.json", self.editor.name());
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&default_name)
            .add_filter("JSON", &["json"])
            .save_file()
        {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                self.editor.set_name(stem);
            }
            match store::save_to_file(&path, &self.editor.to_saved()) {
                Ok(()) => self.status = Some(format!("Saved {}", path.display())),
                Err(e) => self.status = Some(format!("Save failed: {e}")),
            }
        }
    }

    fn open_json_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() {
            self.open_file(&path);
        }
    }

    fn open_file(&mut self, path: &Path) {
        match store::load_from_file(path) {
            Ok(saved) => {
                self.editor.load_saved(saved);
                self.status = Some(format!("Loaded {}", path.display()));
            }
            Err(e) => self.status = Some(format!("Open failed: {e}")),
        }
    }

    fn export_dialog(&mut self) {
        let default_name = Path::new(&self.settings.export_path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("diagram.png")
            .to_string();
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&default_name)
            .add_filter("PNG", &["png"])
            .add_filter("SVG", &["svg"])
            .save_file()
        {
            self.export_to(&path);
        }
    }

    fn export_to(&mut self, path: &Path) {
        if self.editor.export_image(path, self.settings.export_scale) {
            self.settings.export_path = path.display().to_string();
        }
    }

    fn export_default(&mut self) {
        let path = PathBuf::from(&self.settings.export_path);
        self.export_to(&path);
    }

    fn collect_notices(&mut self, now: f64) {
        for notice in self.editor.drain_notices() {
            self.toasts.push(Toast {
                notice,
                expires_at: now + TOAST_SECONDS,
            });
        }
        self.toasts.retain(|t| t.expires_at > now);
    }

    fn draw_toasts(&self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -36.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let accent = match toast.notice.level {
                        NoticeLevel::Info => egui::Color32::from_rgb(90, 160, 255),
                        NoticeLevel::Success => egui::Color32::from_rgb(60, 170, 90),
                        NoticeLevel::Warning => egui::Color32::from_rgb(220, 160, 40),
                        NoticeLevel::Error => egui::Color32::from_rgb(220, 60, 60),
                    };
                    egui::Frame::new()
                        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 230))
                        .stroke(egui::Stroke::new(1.0, accent))
                        .inner_margin(8.0)
                        .corner_radius(egui::CornerRadius::same(6))
                        .show(ui, |ui| {
                            ui.colored_label(egui::Color32::WHITE, &toast.notice.message);
                        });
                    ui.add_space(4.0);
                }
            });
    }
}
