//! Scene graph and interaction engine for an infinite-canvas diagram editor.
//!
//! [`editor::Editor`] owns the scene, undo history and tool state and is
//! driven by [`editor::InputEvent`]s; [`render::build_display_list`] turns it
//! into primitives that the egui canvas and [`svg::to_svg`] both consume.

pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod model;
pub mod notify;
pub mod render;
pub mod scene;
pub mod settings;
pub mod store;
pub mod svg;
pub mod templates;

pub use editor::{Editor, InputEvent, Key, Modifiers, Response, Selection, Tool, View};
pub use history::History;
pub use scene::Scene;
