//! Window input events delivered to the application once per frame.

/// Keyboard key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keycode {
    Escape,
    Space,
    /// Function key `F1`..`F12`.
    F(u8),
    /// Printable character key.
    Char(char),
    /// Platform scan code with no dedicated variant.
    Other(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// A single key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: Keycode,
}

impl KeyEvent {
    pub fn down(key: Keycode) -> Self {
        Self {
            kind: KeyEventKind::Down,
            key,
        }
    }

    pub fn up(key: Keycode) -> Self {
        Self {
            kind: KeyEventKind::Up,
            key,
        }
    }
}

/// Events produced by the window's event pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// The user closed the window.
    Quit,
}
