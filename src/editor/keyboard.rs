use eframe::egui;
use tracing::debug;

use super::{Editor, Key, Modifiers, Response, Selection, TextEdit, Tool};
use crate::model::Shape;

impl Editor {
    pub(super) fn key_down(&mut self, key: Key, m: Modifiers) -> Response {
        if self.text_edit.is_some() {
            return self.text_edit_key(key, m);
        }
        match key {
            Key::Space => {
                self.space_held = true;
                Response::Changed
            }
            Key::Char('z') if m.command && m.shift => Response::changed_if(self.redo()),
            Key::Char('z') if m.command => Response::changed_if(self.undo()),
            Key::Char('y') if m.command => Response::changed_if(self.redo()),
            Key::Delete | Key::Backspace => Response::committed_if(self.delete_selection()),
            Key::Escape => self.escape(),
            Key::Char('g') if m.command && m.shift => Response::committed_if(self.ungroup_selection()),
            Key::Char('g') if m.command => Response::committed_if(self.group_selection()),
            Key::Char('d') if m.command => Response::committed_if(self.duplicate_selection()),
            Key::Char('a') if m.command => self.select_all(),
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                let step = if m.shift {
                    self.settings.nudge_step_fast
                } else {
                    self.settings.nudge_step
                };
                let delta = match key {
                    Key::ArrowLeft => egui::vec2(-step, 0.0),
                    Key::ArrowRight => egui::vec2(step, 0.0),
                    Key::ArrowUp => egui::vec2(0.0, -step),
                    _ => egui::vec2(0.0, step),
                };
                Response::committed_if(self.nudge_selection(delta))
            }
            Key::CloseBracket if m.command => Response::committed_if(self.bring_to_front()),
            Key::CloseBracket => Response::committed_if(self.layer_up()),
            Key::OpenBracket if m.command => Response::committed_if(self.send_to_back()),
            Key::OpenBracket => Response::committed_if(self.layer_down()),
            Key::Char(c) if !m.command && !m.alt => match tool_for_key(c) {
                Some(tool) => {
                    self.set_tool(tool);
                    Response::Changed
                }
                None => Response::Ignored,
            },
            _ => Response::Ignored,
        }
    }

    pub(super) fn key_up(&mut self, key: Key) -> Response {
        if key != Key::Space || !self.space_held {
            return Response::Ignored;
        }
        self.space_held = false;
        if matches!(self.gesture, Some(super::Gesture::Pan { .. })) {
            self.gesture = None;
        }
        Response::Changed
    }

    /// Escape: drop the gesture if one is running, otherwise clear the
    /// selection. Either way the Select tool becomes active.
    fn escape(&mut self) -> Response {
        let had_gesture = self.cancel_gesture();
        if !had_gesture {
            self.selection = Selection::None;
        }
        self.tool = Tool::Select;
        Response::Changed
    }

    /// Opens inline editing for a visible, unlocked node.
    pub fn begin_text_edit(&mut self, id: &str) -> bool {
        let Some(node) = self.scene.node(id).filter(|n| n.is_movable()) else {
            return false;
        };
        let original = node.text.clone();
        self.cancel_gesture();
        self.selection = Selection::from_nodes([id.to_string()]);
        self.text_edit = Some(TextEdit {
            node_id: id.to_string(),
            buffer: original.clone(),
            original,
        });
        debug!(node_id = id, "text edit started");
        true
    }

    /// Ends inline editing, committing once if the text changed.
    pub fn blur(&mut self) -> Response {
        let Some(edit) = self.text_edit.take() else {
            return Response::Ignored;
        };
        if edit.buffer == edit.original {
            return Response::Changed;
        }
        if self.set_node_text(&edit.node_id, edit.buffer) {
            Response::Committed
        } else {
            Response::Changed
        }
    }

    pub fn cancel_text_edit(&mut self) -> Response {
        match self.text_edit.take() {
            Some(_) => Response::Changed,
            None => Response::Ignored,
        }
    }

    fn text_edit_key(&mut self, key: Key, m: Modifiers) -> Response {
        match key {
            Key::Escape => self.cancel_text_edit(),
            Key::Enter if m.command => self.blur(),
            Key::Enter => self.type_text("\n"),
            Key::Backspace => match self.text_edit.as_mut().and_then(|e| e.buffer.pop()) {
                Some(_) => Response::Changed,
                None => Response::Ignored,
            },
            _ => Response::Ignored,
        }
    }

    pub(super) fn type_text(&mut self, text: &str) -> Response {
        let Some(edit) = self.text_edit.as_mut() else {
            return Response::Ignored;
        };
        let before = edit.buffer.len();
        edit.buffer
            .extend(text.chars().filter(|c| *c == '\n' || !c.is_control()));
        if edit.buffer.len() != before {
            Response::Changed
        } else {
            Response::Ignored
        }
    }
}

fn tool_for_key(c: char) -> Option<Tool> {
    Some(match c {
        'v' => Tool::Select,
        't' => Tool::AddText,
        's' => Tool::AddSticker,
        'z' => Tool::AddZone,
        'r' => Tool::AddShape(Shape::Rect),
        'o' => Tool::AddShape(Shape::Circle),
        'c' => Tool::DrawConnection,
        'p' => Tool::DrawFreehand,
        _ => return None,
    })
}
