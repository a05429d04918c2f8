use crate::foundation::core::PixelSize;
use crate::input::pointer::{PointerPoint, ResizeHandle};
use crate::scene::session::EditSession;
use serde::{Deserialize, Serialize};

/// Largest initial dimension of a freshly placed cutout, in container pixels.
const INITIAL_MAX_DIMENSION_PX: f64 = 200.0;

/// Position and size of the cutout over a generated background, in container
/// pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl PlacementRect {
    /// Default placement for a cutout of the given natural size: top-left
    /// corner, largest dimension capped, aspect preserved.
    pub fn initial_for(cutout: PixelSize) -> Self {
        let aspect = cutout.aspect_ratio();
        let (width, height) = if aspect > 1.0 {
            (INITIAL_MAX_DIMENSION_PX, INITIAL_MAX_DIMENSION_PX / aspect)
        } else {
            (INITIAL_MAX_DIMENSION_PX * aspect, INITIAL_MAX_DIMENSION_PX)
        };
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// Width over height.
    pub fn aspect_ratio(self) -> f64 {
        self.width / self.height
    }
}

/// Tunables for cutout placement gestures.
#[derive(Clone, Copy, Debug)]
pub struct PlacementConfig {
    /// Smallest width reachable through a resize handle.
    pub min_width_px: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { min_width_px: 100.0 }
    }
}

/// What the pointer went down on inside the background preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementTarget {
    /// The cutout body.
    Body,
    /// A corner resize handle.
    Handle(ResizeHandle),
    /// Anywhere outside the cutout.
    Background,
}

#[derive(Clone, Copy, Debug)]
enum PlacementState {
    Idle,
    Dragging {
        // Pointer position minus rect origin at gesture start; moving keeps
        // this offset constant so the cutout does not jump under the finger.
        anchor: PointerPoint,
    },
    Resizing {
        handle: ResizeHandle,
        pointer_origin: PointerPoint,
        origin: PlacementRect,
    },
}

/// Drag/resize controller for the cutout-over-generated-background flow.
///
/// Unlike text layers, the cutout is positioned in raw container pixels and
/// resizes preserve its aspect ratio.
#[derive(Debug)]
pub struct PlacementController {
    cfg: PlacementConfig,
    state: PlacementState,
    selected: bool,
}

impl PlacementController {
    /// Create an idle controller.
    pub fn new(cfg: PlacementConfig) -> Self {
        Self {
            cfg,
            state: PlacementState::Idle,
            selected: false,
        }
    }

    /// Whether the cutout is selected (showing resize handles).
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Pointer went down on `target` at `at`.
    pub fn pointer_start(
        &mut self,
        session: &mut EditSession,
        target: PlacementTarget,
        at: PointerPoint,
    ) {
        let Some(rect) = session.cutout_placement() else {
            return;
        };
        match target {
            PlacementTarget::Body => {
                self.selected = true;
                self.state = PlacementState::Dragging {
                    anchor: PointerPoint::new(at.x - rect.x, at.y - rect.y),
                };
            }
            PlacementTarget::Handle(handle) => {
                self.selected = true;
                self.state = PlacementState::Resizing {
                    handle,
                    pointer_origin: at,
                    origin: rect,
                };
            }
            PlacementTarget::Background => {
                self.selected = false;
                self.state = PlacementState::Idle;
            }
        }
    }

    /// Pointer moved to `at` while down.
    pub fn pointer_move(&mut self, session: &mut EditSession, at: PointerPoint) {
        let Some(rect) = session.cutout_placement() else {
            return;
        };
        match self.state {
            PlacementState::Idle => {}
            PlacementState::Dragging { anchor } => {
                session.set_cutout_placement(PlacementRect {
                    x: at.x - anchor.x,
                    y: at.y - anchor.y,
                    ..rect
                });
            }
            PlacementState::Resizing {
                handle,
                pointer_origin,
                origin,
            } => {
                let delta_x = at.x - pointer_origin.x;
                let aspect = origin.aspect_ratio();

                let new_width = if handle.is_left() {
                    (origin.width - delta_x).max(self.cfg.min_width_px)
                } else {
                    (origin.width + delta_x).max(self.cfg.min_width_px)
                };
                let new_height = new_width / aspect;

                // Left/top handles compensate the origin so the opposite
                // corner stays put.
                let new_x = if handle.is_left() {
                    origin.x + (origin.width - new_width)
                } else {
                    origin.x
                };
                let new_y = if handle.is_top() {
                    origin.y + (origin.height - new_height)
                } else {
                    origin.y
                };

                session.set_cutout_placement(PlacementRect {
                    x: new_x,
                    y: new_y,
                    width: new_width,
                    height: new_height,
                });
            }
        }
    }

    /// Pointer was released; transient gesture state is discarded.
    pub fn pointer_end(&mut self) {
        self.state = PlacementState::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/placement.rs"]
mod tests;
