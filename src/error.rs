//! Error types for the fallible edges of the editor: persistence, export and
//! settings. The interaction engine itself never fails; degenerate input is
//! discarded instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color {0:?}")]
pub struct ColorParseError(pub String);

/// Errors from saving or loading diagrams.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no saved diagram named {0:?}")]
    NotFound(String),

    #[error("invalid diagram name {0:?}")]
    InvalidName(String),
}

/// Errors from rasterizing the exported vector document.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SVG parse error: {0}")]
    Svg(String),

    #[error("export scale must be a positive number, got {0}")]
    InvalidScale(f32),

    #[error("cannot allocate a {width}x{height} image")]
    Pixmap { width: u32, height: u32 },

    #[error("PNG encode error: {0}")]
    Encode(String),

    #[error("raster export is not available in this build")]
    Unsupported,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
