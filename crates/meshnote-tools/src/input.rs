//! Pointer events as seen by the interaction tools.

use glam::DVec2;

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keyboard modifiers held during an event.
///
/// `ctrl` is the selection modifier: without it, clicks belong to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
    };
}

/// A pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed {
        button: MouseButton,
        position: DVec2,
        modifiers: Modifiers,
    },
    Released {
        button: MouseButton,
        position: DVec2,
        modifiers: Modifiers,
    },
    Moved {
        position: DVec2,
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    /// A press of `button` at `(x, y)` with the selection modifier held.
    pub fn ctrl_press(button: MouseButton, x: f64, y: f64) -> Self {
        Self::Pressed {
            button,
            position: DVec2::new(x, y),
            modifiers: Modifiers::CTRL,
        }
    }

    /// A release of `button` at `(x, y)` with the selection modifier held.
    pub fn ctrl_release(button: MouseButton, x: f64, y: f64) -> Self {
        Self::Released {
            button,
            position: DVec2::new(x, y),
            modifiers: Modifiers::CTRL,
        }
    }

    /// A plain press of `button` at `(x, y)`.
    pub fn press(button: MouseButton, x: f64, y: f64) -> Self {
        Self::Pressed {
            button,
            position: DVec2::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    /// A pointer move to `(x, y)` with the selection modifier held.
    pub fn ctrl_move(x: f64, y: f64) -> Self {
        Self::Moved {
            position: DVec2::new(x, y),
            modifiers: Modifiers::CTRL,
        }
    }

    #[must_use]
    pub fn position(&self) -> DVec2 {
        match *self {
            Self::Pressed { position, .. }
            | Self::Released { position, .. }
            | Self::Moved { position, .. } => position,
        }
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        match *self {
            Self::Pressed { modifiers, .. }
            | Self::Released { modifiers, .. }
            | Self::Moved { modifiers, .. } => modifiers,
        }
    }
}

/// What a tool did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    /// Not for this tool; the shell may hand it to camera navigation.
    Ignored,
    /// Consumed without a visible change.
    Consumed,
    /// Consumed and the view must be redrawn.
    Changed,
}

impl EventResponse {
    #[must_use]
    pub fn needs_redraw(self) -> bool {
        self == Self::Changed
    }
}
