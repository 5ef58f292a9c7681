use eframe::egui::{Pos2, Vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub command: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        command: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        command: false,
        alt: false,
    };
    pub const COMMAND: Modifiers = Modifiers {
        shift: false,
        command: true,
        alt: false,
    };
    pub const COMMAND_SHIFT: Modifiers = Modifiers {
        shift: true,
        command: true,
        alt: false,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    Escape,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    OpenBracket,
    CloseBracket,
    /// Lowercase letter keys.
    Char(char),
}

/// Everything the editor reacts to. Positions are canvas-local screen
/// coordinates; the editor maps them through its view.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Pos2, modifiers: Modifiers },
    PointerMove { pos: Pos2, modifiers: Modifiers },
    PointerUp { pos: Pos2, modifiers: Modifiers },
    DoubleClick { pos: Pos2 },
    /// Positive `delta.y` zooms in.
    Wheel { pos: Pos2, delta: Vec2 },
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key },
    Text(String),
}

impl InputEvent {
    pub fn down(pos: Pos2) -> Self {
        InputEvent::PointerDown {
            pos,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(pos: Pos2) -> Self {
        InputEvent::PointerMove {
            pos,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(pos: Pos2) -> Self {
        InputEvent::PointerUp {
            pos,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: Key) -> Self {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_with(key: Key, modifiers: Modifiers) -> Self {
        InputEvent::KeyDown { key, modifiers }
    }
}
