//! Pointer input.
//!
//! Viewer pointer events in screen pixels (y up), as the host delivers them
//! to the transform manipulator.

use sm_core::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved with no button held.
    PointerMove { x: f64, y: f64 },

    /// Button pressed.
    PointerDown { x: f64, y: f64 },

    /// Pointer moved with the button held.
    PointerDrag { x: f64, y: f64 },

    /// Button released.
    PointerUp { x: f64, y: f64 },
}

impl InputEvent {
    pub fn from_pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn from_pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn from_pointer_drag(x: f64, y: f64) -> Self {
        Self::PointerDrag { x, y }
    }

    pub fn from_pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn position(&self) -> Point {
        match *self {
            Self::PointerMove { x, y }
            | Self::PointerDown { x, y }
            | Self::PointerDrag { x, y }
            | Self::PointerUp { x, y } => Point::new(x, y),
        }
    }
}
