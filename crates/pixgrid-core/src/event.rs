#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! The host (browser shell, native window, test harness) translates its raw
//! pointer, wheel, and touch callbacks into [`InputEvent`]s before handing
//! them to the interaction controller.
//!
//! # Design Notes
//!
//! - Positions are `f64` screen pixels relative to the grid container's
//!   top-left corner; the host subtracts the container's bounding box.
//! - Button indices follow the DOM convention (0 = primary, 1 = middle,
//!   2 = secondary).
//! - Wheel deltas keep their sign only; magnitude does not scale the zoom
//!   step.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;

use crate::geometry::Point;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A mouse or pen pointer event.
    Pointer(PointerEvent),

    /// A wheel / trackpad scroll event.
    Wheel(WheelEvent),

    /// A touch event carrying every active touch point.
    Touch(TouchEvent),

    /// Focus gained or lost.
    ///
    /// `true` = focus gained, `false` = focus lost.
    Focus(bool),
}

impl InputEvent {
    /// Short stable name for logs.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Pointer(p) => match p.kind {
                PointerEventKind::Down(_) => "pointer_down",
                PointerEventKind::Up(_) => "pointer_up",
                PointerEventKind::Move => "pointer_move",
                PointerEventKind::Leave => "pointer_leave",
            },
            Self::Wheel(_) => "wheel",
            Self::Touch(t) => match t.phase {
                TouchPhase::Start => "touch_start",
                TouchPhase::Move => "touch_move",
                TouchPhase::End => "touch_end",
                TouchPhase::Cancel => "touch_cancel",
            },
            Self::Focus(_) => "focus",
        }
    }
}

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// X position in container pixels.
    pub x: f64,

    /// Y position in container pixels.
    pub y: f64,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Get the position as a [`Point`].
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed down.
    Down(PointerButton),

    /// Button released.
    Up(PointerButton),

    /// Pointer moved, with or without a button held.
    Move,

    /// Pointer left the container.
    Leave,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary (usually left) button, DOM index 0.
    Primary,

    /// Middle button (scroll wheel click), DOM index 1.
    Middle,

    /// Secondary (usually right) button, DOM index 2.
    Secondary,

    /// Any other button index.
    Other(u8),
}

impl PointerButton {
    /// DOM `MouseEvent.button` index.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Primary => 0,
            Self::Middle => 1,
            Self::Secondary => 2,
            Self::Other(n) => n,
        }
    }

    /// Map a DOM `MouseEvent.button` index to a button.
    #[must_use]
    pub const fn from_u8(n: u8) -> Self {
        match n {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }

    /// Whether pressing this button starts a pan.
    #[inline]
    #[must_use]
    pub const fn starts_pan(self) -> bool {
        matches!(self, Self::Primary | Self::Middle)
    }
}

/// A wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// X position in container pixels.
    pub x: f64,

    /// Y position in container pixels.
    pub y: f64,

    /// Horizontal delta.
    pub dx: f64,

    /// Vertical delta. Negative scrolls up (zoom in).
    pub dy: f64,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl WheelEvent {
    /// Create a vertical wheel event at the given position.
    #[must_use]
    pub const fn vertical(x: f64, y: f64, dy: f64) -> Self {
        Self {
            x,
            y,
            dx: 0.0,
            dy,
            modifiers: Modifiers::NONE,
        }
    }
}

/// Phase for touch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// One or more touches began.
    Start,
    /// Active touches moved.
    Move,
    /// One or more touches lifted.
    End,
    /// The platform cancelled the touch sequence.
    Cancel,
}

/// A single touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Platform touch identifier.
    pub id: u32,
    /// X position in container pixels.
    pub x: f64,
    /// Y position in container pixels.
    pub y: f64,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(id: u32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    /// Position as a [`Point`].
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A touch event.
///
/// `touches` lists the contacts still on the surface after the event
/// (the DOM `TouchEvent.touches` list), so it is empty on the final `End`.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    /// Lifecycle phase.
    pub phase: TouchPhase,
    /// Active touch contacts.
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Create a touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }

    /// Distance between the first two contacts, if there are at least two.
    #[must_use]
    pub fn pinch_distance(&self) -> Option<f64> {
        match self.touches.as_slice() {
            [a, b, ..] => Some(a.position().distance(b.position())),
            _ => None,
        }
    }

    /// Position of the first contact.
    #[must_use]
    pub fn primary(&self) -> Option<Point> {
        self.touches.first().map(TouchPoint::position)
    }
}
