use crate::foundation::core::ContainerSize;
use crate::foundation::error::UnderlayResult;
use crate::input::pointer::{PointerPoint, ResizeHandle};
use crate::scene::layer::LayerId;
use crate::scene::session::EditSession;

/// Tunables for interactive layer transforms.
#[derive(Clone, Copy, Debug)]
pub struct GestureConfig {
    /// Smallest font size reachable through the resize handle.
    pub min_font_size_px: f64,
    /// Vertical-delta multiplier for resize; below 1.0 the handle moves
    /// faster than the font grows, which keeps resizing from feeling twitchy.
    pub resize_damping: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_font_size_px: 20.0,
            resize_damping: 0.5,
        }
    }
}

/// What the pointer went down on, as judged by the embedder's hit test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureTarget {
    /// The body of a text layer.
    LayerBody(LayerId),
    /// A corner resize handle of a text layer.
    Handle(LayerId, ResizeHandle),
    /// Anywhere outside the layers and the property editor.
    Background,
}

#[derive(Clone, Copy, Debug)]
enum GestureState {
    Idle,
    Dragging {
        layer: LayerId,
        pointer_origin: PointerPoint,
    },
    Resizing {
        layer: LayerId,
        handle: ResizeHandle,
        pointer_origin: PointerPoint,
        origin_font_size: f64,
    },
}

/// Translates pointer gestures into percent-space position updates and
/// pixel-space font-size updates for the targeted text layer, and manages
/// the single-selection state.
///
/// Gestures are strictly sequential: a pointer-down while a gesture is in
/// flight restarts cleanly, it never corrupts layer state.
#[derive(Debug)]
pub struct TransformController {
    cfg: GestureConfig,
    container: ContainerSize,
    state: GestureState,
}

impl TransformController {
    /// Create a controller for a container of the given on-screen size.
    pub fn new(container: ContainerSize, cfg: GestureConfig) -> Self {
        Self {
            cfg,
            container,
            state: GestureState::Idle,
        }
    }

    /// Update the container size after a viewport resize.
    ///
    /// Positions are stored in percent space, so no layer state needs
    /// rewriting; only the pixel-to-percent conversion changes.
    pub fn set_container(&mut self, container: ContainerSize) {
        self.container = container;
    }

    /// Whether no gesture is currently in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Pointer went down on `target` at `at`.
    pub fn pointer_start(
        &mut self,
        session: &mut EditSession,
        target: GestureTarget,
        at: PointerPoint,
    ) -> UnderlayResult<()> {
        match target {
            GestureTarget::LayerBody(layer) => {
                session.select(layer)?;
                self.state = GestureState::Dragging {
                    layer,
                    pointer_origin: at,
                };
            }
            GestureTarget::Handle(layer, handle) => {
                session.select(layer)?;
                let origin_font_size = session
                    .layer(layer)
                    .map(|l| l.style.font_size_px)
                    .unwrap_or_default();
                self.state = GestureState::Resizing {
                    layer,
                    handle,
                    pointer_origin: at,
                    origin_font_size,
                };
            }
            GestureTarget::Background => {
                session.deselect();
                self.state = GestureState::Idle;
            }
        }
        Ok(())
    }

    /// Pointer moved to `at` while down.
    pub fn pointer_move(
        &mut self,
        session: &mut EditSession,
        at: PointerPoint,
    ) -> UnderlayResult<()> {
        match self.state {
            GestureState::Idle => Ok(()),
            GestureState::Dragging {
                layer,
                pointer_origin,
            } => {
                // Incremental tracking: convert the delta since the previous
                // event and re-anchor, so clamping at an edge cannot build up
                // drift between the pointer and the layer.
                let dx_percent = (at.x - pointer_origin.x) / self.container.width * 100.0;
                let dy_percent = (at.y - pointer_origin.y) / self.container.height * 100.0;
                let Some(current) = session.layer(layer).map(|l| l.position) else {
                    self.state = GestureState::Idle;
                    return Ok(());
                };
                session.update_position(layer, current.offset_by(dx_percent, dy_percent))?;
                self.state = GestureState::Dragging {
                    layer,
                    pointer_origin: at,
                };
                Ok(())
            }
            GestureState::Resizing {
                layer,
                handle,
                pointer_origin,
                origin_font_size,
            } => {
                let delta_y = (at.y - pointer_origin.y) * self.cfg.resize_damping;
                let max = self.container.height / 2.0;
                let new_size = (origin_font_size + delta_y).min(max).max(self.cfg.min_font_size_px);
                let Some(mut style) = session.layer(layer).map(|l| l.style.clone()) else {
                    self.state = GestureState::Idle;
                    return Ok(());
                };
                tracing::trace!(?handle, new_size, "resizing text layer");
                style.font_size_px = new_size;
                session.update_style(layer, style)
            }
        }
    }

    /// Pointer was released; transient gesture state is discarded.
    pub fn pointer_end(&mut self) {
        self.state = GestureState::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/gesture.rs"]
mod tests;
