use serde::{Deserialize, Serialize};

/// Input modality a pointer event originated from.
///
/// Mouse and touch streams are normalized into the same event shape before
/// they reach the gesture controllers; the kind is kept for diagnostics only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    /// Mouse input (`mousedown`/`mousemove`/`mouseup`).
    Mouse,
    /// Touch input (`touchstart`/`touchmove`/`touchend`).
    Touch,
}

/// Pointer position in client (viewport) pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerPoint {
    /// Horizontal client coordinate.
    pub x: f64,
    /// Vertical client coordinate.
    pub y: f64,
}

impl PointerPoint {
    /// Construct from client coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Lifecycle phase of a pointer gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    /// Pointer went down.
    Start,
    /// Pointer moved while down.
    Move,
    /// Pointer was released.
    End,
}

/// One normalized pointer event, dispatched from either input modality.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Gesture phase.
    pub phase: PointerPhase,
    /// Originating modality.
    pub kind: PointerKind,
    /// Position in client pixels.
    pub position: PointerPoint,
}

impl PointerEvent {
    /// A `Start` event at the given position.
    pub fn start(kind: PointerKind, position: PointerPoint) -> Self {
        Self {
            phase: PointerPhase::Start,
            kind,
            position,
        }
    }

    /// A `Move` event at the given position.
    pub fn moved(kind: PointerKind, position: PointerPoint) -> Self {
        Self {
            phase: PointerPhase::Move,
            kind,
            position,
        }
    }

    /// An `End` event at the given position.
    pub fn end(kind: PointerKind, position: PointerPoint) -> Self {
        Self {
            phase: PointerPhase::End,
            kind,
            position,
        }
    }
}

/// Which corner resize handle a gesture grabbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

impl ResizeHandle {
    /// All four corners, in display order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Whether this handle sits on the left edge.
    pub fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Whether this handle sits on the top edge.
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}
