//! Input abstraction layer.
//!
//! Normalizes browser pointer, wheel, drag-and-drop and keyboard events
//! into one `InputEvent` enum consumed by the canvas. Coordinates are
//! surface pixels relative to the canvas' top-left corner.

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on Linux/Windows, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    DoubleClick {
        x: f32,
        y: f32,
    },
    /// Wheel or pinch.
    Scroll {
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
        /// Zoom factor (1.0 = no change; >1 = zoom in).
        zoom: f32,
    },
    /// A drag from outside the canvas is hovering. Browsers usually hide
    /// the payload until drop, so it may be `None`.
    DragOver {
        x: f32,
        y: f32,
        payload: Option<String>,
    },
    DragLeave,
    Drop {
        x: f32,
        y: f32,
        payload: Option<String>,
    },
    Key {
        key: String,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.into(),
            modifiers,
        }
    }

    pub fn click_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn click_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn drop(x: f32, y: f32, payload: &str) -> Self {
        Self::Drop {
            x,
            y,
            payload: Some(payload.to_string()),
        }
    }

    /// Extract position if this is a positional event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y, .. }
            | Self::DoubleClick { x, y }
            | Self::Scroll { x, y, .. }
            | Self::DragOver { x, y, .. }
            | Self::Drop { x, y, .. } => Some((*x, *y)),
            Self::DragLeave | Self::Key { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_ctrl_or_meta() {
        assert!(Modifiers::CTRL.command());
        assert!(
            Modifiers {
                meta: true,
                ..Modifiers::NONE
            }
            .command()
        );
        assert!(!Modifiers::SHIFT.command());
    }

    #[test]
    fn positions() {
        assert_eq!(InputEvent::drop(3.0, 4.0, "ct").position(), Some((3.0, 4.0)));
        assert_eq!(InputEvent::DragLeave.position(), None);
    }
}
