//! Input abstraction layer.
//!
//! Normalizes browser touch and keyboard events into `InputEvent`s the
//! session consumes. Coordinates are in screen pixels relative to the canvas
//! element.

use mm_core::{Point, Vec2};
use smallvec::SmallVec;

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Active touches. Two fit inline; that is all a pinch needs.
pub type Touches = SmallVec<[TouchPoint; 4]>;

#[derive(Debug, Clone)]
pub enum InputEvent {
    TouchStart(Touches),
    TouchMove(Touches),
    /// `remaining` holds the contacts still down.
    TouchEnd { remaining: Touches },
    Key {
        key: String,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    },
}

impl InputEvent {
    pub fn touches(&self) -> Option<&[TouchPoint]> {
        match self {
            Self::TouchStart(t) | Self::TouchMove(t) => Some(t),
            Self::TouchEnd { remaining } => Some(remaining),
            Self::Key { .. } => None,
        }
    }
}

/// Geometry of the first two contacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoFinger {
    pub midpoint: Point,
    pub distance: f64,
    /// Angle of the line between the fingers, degrees.
    pub angle: f64,
}

impl TwoFinger {
    /// `None` unless at least two contacts are down.
    pub fn from_touches(touches: &[TouchPoint]) -> Option<Self> {
        let [a, b, ..] = touches else {
            return None;
        };
        let (pa, pb) = (a.position(), b.position());
        let delta: Vec2 = pb - pa;
        Some(Self {
            midpoint: pa.midpoint(pb),
            distance: delta.hypot(),
            angle: delta.atan2().to_degrees(),
        })
    }
}
