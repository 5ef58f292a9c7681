use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::model::PenStyle;
use crate::templates::DiagramType;

/// Knobs the interaction engine reads. Distances are in screen pixels and
/// are divided by the zoom level before hit testing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub history_limit: usize,
    pub min_node_size: f32,
    pub drag_threshold: f32,
    pub hit_tolerance: f32,
    pub connection_hit_width: f32,
    pub handle_size: f32,
    pub nudge_step: f32,
    pub nudge_step_fast: f32,
    pub lasso_selection: bool,
    pub pen: PenStyle,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            zoom_min: 0.1,
            zoom_max: 3.0,
            history_limit: crate::history::DEFAULT_LIMIT,
            min_node_size: 20.0,
            drag_threshold: 3.0,
            hit_tolerance: 4.0,
            connection_hit_width: 12.0,
            handle_size: 10.0,
            nudge_step: 1.0,
            nudge_step_fast: 10.0,
            lasso_selection: false,
            pen: PenStyle::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub storage_dir: String,
    pub export_path: String,
    pub export_scale: f32,
    pub prune_dangling_on_save: bool,
    pub default_diagram_type: DiagramType,
    pub editor: EditorSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir().display().to_string(),
            export_path: "diagram.png".to_string(),
            export_scale: 2.0,
            prune_dangling_on_save: false,
            default_diagram_type: DiagramType::Freeform,
            editor: EditorSettings::default(),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn default_storage_dir() -> PathBuf {
    home_dir()
        .map(|h| h.join(".local").join("share").join("innolab"))
        .unwrap_or_else(|| PathBuf::from("diagrams"))
}

/// `~/.config/innolab.toml` if present, else `settings.toml` in the working
/// directory if present.
pub fn config_path() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let path = home.join(".config").join("innolab.toml");
        if path.exists() {
            return Some(path);
        }
    }
    let local = PathBuf::from("settings.toml");
    local.exists().then_some(local)
}

pub fn load_settings(path: &Path) -> Result<AppSettings, SettingsError> {
    let s = std::fs::read_to_string(path)?;
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    if is_toml {
        match toml::from_str::<AppSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(e) => serde_json::from_str::<AppSettings>(&s).map_err(|_| e.into()),
        }
    } else {
        match serde_json::from_str::<AppSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(e) => toml::from_str::<AppSettings>(&s).map_err(|_| e.into()),
        }
    }
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    let text = if is_toml {
        toml::to_string_pretty(settings)?
    } else {
        serde_json::to_string_pretty(settings)?
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("innolab.toml");
        std::fs::write(&path, "export_scale = 3.0\n\n[editor]\nzoom_max = 2.5\n").unwrap();
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.export_scale, 3.0);
        assert_eq!(settings.editor.zoom_max, 2.5);
        assert_eq!(settings.editor.zoom_min, 0.1);
        assert_eq!(settings.editor.history_limit, 50);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("innolab.toml");
        let mut settings = AppSettings::default();
        settings.editor.lasso_selection = true;
        settings.default_diagram_type = DiagramType::Swot;
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }
}
