//! Quad hit-testing for the transform manipulator.
//!
//! Image quads come from the renderer as four corners `[a, b, c, d]`, with
//! `b - a` along the image width and `d - a` along its height. Screen y
//! grows upward, so a corner above the center is a top corner.

use sm_core::{Cursor, Point, Quad};

/// Which part of an image the pointer grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    #[default]
    None,
    FreeTranslation,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Control {
    /// Cursor shown while hovering this control.
    pub fn cursor(self) -> Cursor {
        match self {
            Control::TopRight | Control::BottomLeft => Cursor::SizeBDiag,
            Control::TopLeft | Control::BottomRight => Cursor::SizeFDiag,
            Control::FreeTranslation => Cursor::OpenHand,
            Control::None => Cursor::WhatsThis,
        }
    }

    pub fn is_corner(self) -> bool {
        !matches!(self, Control::None | Control::FreeTranslation)
    }
}

/// A classified grab: the control plus which quad corner it holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    pub control: Control,
    /// Index into the quad of the grabbed corner, if any.
    pub corner: Option<usize>,
    pub center: Point,
}

/// Mean of the four corners.
pub fn quad_center(quad: &Quad) -> Point {
    let (x, y) = quad
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    Point::new(x / 4.0, y / 4.0)
}

/// Classify a pointer inside `quad`: the first corner within `radius` on
/// both axes, otherwise free translation.
pub fn classify(quad: &Quad, p: Point, radius: f64) -> Grab {
    let center = quad_center(quad);
    for (i, c) in quad.iter().enumerate() {
        if (c.x - p.x).abs() < radius && (c.y - p.y).abs() < radius {
            let left = c.x < center.x;
            let top = c.y > center.y;
            let control = match (left, top) {
                (true, true) => Control::TopLeft,
                (false, true) => Control::TopRight,
                (true, false) => Control::BottomLeft,
                (false, false) => Control::BottomRight,
            };
            return Grab {
                control,
                corner: Some(i),
                center,
            };
        }
    }
    Grab {
        control: Control::FreeTranslation,
        corner: None,
        center,
    }
}
