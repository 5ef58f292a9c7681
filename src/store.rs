//! Named diagram documents on disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::scene::Scene;
use crate::templates::DiagramType;

/// `{ nodes, connections, paths, type, name, timestamp }` as written to disk.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SavedScene {
    #[serde(flatten)]
    pub scene: Scene,
    #[serde(rename = "type", default)]
    pub diagram_type: DiagramType,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
}

impl SavedScene {
    pub fn new(name: impl Into<String>, diagram_type: DiagramType, scene: Scene) -> Self {
        Self {
            scene,
            diagram_type,
            name: name.into(),
            timestamp: now_millis(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub trait SceneStore {
    fn save(&self, saved: &SavedScene) -> StoreResult<()>;
    fn load(&self, name: &str) -> StoreResult<SavedScene>;
    /// Stored names, sorted.
    fn list(&self) -> StoreResult<Vec<String>>;
    fn delete(&self, name: &str) -> StoreResult<()>;
}

/// One `<name>.json` file per diagram inside a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    let bad = name.trim().is_empty()
        || name.contains(['/', '\\'])
        || name.starts_with('.')
        || name.contains("..");
    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl SceneStore for FileStore {
    fn save(&self, saved: &SavedScene) -> StoreResult<()> {
        let path = self.path_for(&saved.name)?;
        std::fs::create_dir_all(&self.dir)?;
        save_to_file(&path, saved)?;
        info!(name = %saved.name, path = %path.display(), "saved diagram");
        Ok(())
    }

    fn load(&self, name: &str) -> StoreResult<SavedScene> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let saved = load_from_file(&path)?;
        info!(name, nodes = saved.scene.nodes.len(), "loaded diagram");
        Ok(saved)
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        debug!(count = names.len(), "listed diagrams");
        Ok(names)
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        info!(name, "deleted diagram");
        Ok(())
    }
}

/// Writes a document to an arbitrary path (file dialogs).
pub fn save_to_file(path: &Path, saved: &SavedScene) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(saved)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_from_file(path: &Path) -> StoreResult<SavedScene> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
