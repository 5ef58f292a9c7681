//! Single integration test binary.
//!
//! - history: undo/redo behavior through the editor
//! - editor: pointer and keyboard gestures end to end
//! - geometry: anchoring and hit testing
//! - render: display list and SVG output
//! - store: saving and loading diagrams on disk

mod helpers;

mod editor_tests;
mod geometry_tests;
mod history_tests;
mod render_tests;
mod store_tests;
