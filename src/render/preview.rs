use crate::foundation::core::{ContainerSize, Point, Rect, fit_contain};
use crate::foundation::error::{UnderlayError, UnderlayResult};
use crate::input::pointer::ResizeHandle;
use crate::scene::layer::{LayerId, TextStyle};
use crate::scene::session::EditSession;
use serde::Serialize;

/// One raster tier of the live preview (base photo or cutout).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageTier {
    /// Rect the image occupies inside the container (`object-fit: contain`).
    pub rect: Rect,
    /// Whether pointer events pass through this tier. The cutout sits on top
    /// of the text layers but must never swallow their gestures.
    pub pointer_transparent: bool,
}

/// One text tier of the live preview.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextTier {
    /// Backing layer id.
    pub layer: LayerId,
    /// Center/middle anchor in container pixels.
    pub anchor: Point,
    /// Layer text.
    pub text: String,
    /// Style snapshot in container-pixel units.
    pub style: TextStyle,
    /// Whether this layer is the selected one.
    pub selected: bool,
    /// Corner resize handles; present only on the selected layer.
    pub handles: Vec<ResizeHandle>,
}

/// Declarative three-tier visual stack for the live preview.
///
/// The embedding shell renders this however it likes (DOM, canvas, native
/// views); the engine only guarantees the stacking order: base photo at the
/// bottom, text tiers in insertion order, cutout on top.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewStack {
    /// Container box the stack is laid out in.
    pub container: ContainerSize,
    /// Bottom tier: the uploaded photo.
    pub base: ImageTier,
    /// Middle tiers: text layers, bottom to top.
    pub texts: Vec<TextTier>,
    /// Top tier: the background-removed cutout, once it has arrived.
    pub cutout: Option<ImageTier>,
}

/// Produce the visual stack for the current session state.
///
/// Pure: no side effects beyond the returned value. Call again after every
/// state change; nothing is retained between calls.
pub fn render_preview(
    session: &EditSession,
    container: ContainerSize,
) -> UnderlayResult<PreviewStack> {
    let Some(original) = session.original() else {
        return Err(UnderlayError::validation("no image uploaded"));
    };

    let base = ImageTier {
        rect: fit_contain(original.size(), container),
        pointer_transparent: false,
    };

    let texts = session
        .layers()
        .iter()
        .map(|layer| {
            let selected = session.selected() == Some(layer.id);
            TextTier {
                layer: layer.id,
                anchor: Point::new(
                    layer.position.x / 100.0 * container.width,
                    layer.position.y / 100.0 * container.height,
                ),
                text: layer.text.clone(),
                style: layer.style.clone(),
                selected,
                handles: if selected {
                    ResizeHandle::ALL.to_vec()
                } else {
                    Vec::new()
                },
            }
        })
        .collect();

    let cutout = session.cutout().map(|cutout| ImageTier {
        rect: fit_contain(cutout.size(), container),
        pointer_transparent: true,
    });

    Ok(PreviewStack {
        container,
        base,
        texts,
        cutout,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
