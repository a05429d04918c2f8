use std::sync::Arc;

use crate::foundation::core::{PercentPoint, PixelSize};
use crate::foundation::error::{UnderlayError, UnderlayResult};
use crate::input::placement::PlacementRect;
use crate::scene::layer::{LayerId, TextLayer, TextStyle};

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    size: PixelSize,
    rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap premultiplied pixel bytes, validating the buffer length.
    pub fn from_premul_parts(size: PixelSize, rgba8_premul: Vec<u8>) -> UnderlayResult<Self> {
        let expected = (size.width as usize)
            .saturating_mul(size.height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(UnderlayError::load("pixel buffer length mismatch"));
        }
        Ok(Self {
            size,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Natural pixel dimensions.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Row-major premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// Token tying an in-flight background-removal request to the upload that
/// produced it. A cutout delivered with a stale ticket is discarded, so a
/// slow response can never overwrite a newer upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadTicket(u64);

/// Editing state for one text-behind-subject composition.
///
/// Owns the uploaded photo, its cutout, the ordered text layers and the
/// single-selection state the property editor binds to.
#[derive(Debug, Default)]
pub struct EditSession {
    generation: u64,
    original: Option<PreparedImage>,
    cutout: Option<PreparedImage>,
    background: Option<PreparedImage>,
    cutout_placement: Option<PlacementRect>,
    layers: Vec<TextLayer>,
    selected: Option<LayerId>,
    next_layer_id: u64,
}

impl EditSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly uploaded photo, superseding any in-flight processing.
    ///
    /// The previous cutout is cleared; the returned ticket must accompany the
    /// cutout produced for this upload.
    pub fn set_original(&mut self, image: PreparedImage) -> UploadTicket {
        self.generation += 1;
        self.original = Some(image);
        self.cutout = None;
        UploadTicket(self.generation)
    }

    /// Attach the background-removed cutout for the given upload.
    ///
    /// Returns `false` (and drops the image) when the ticket is stale, i.e. a
    /// newer upload started while this cutout was being produced.
    pub fn attach_cutout(&mut self, ticket: UploadTicket, image: PreparedImage) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                stale = ticket.0,
                current = self.generation,
                "discarding stale cutout response"
            );
            return false;
        }
        self.cutout = Some(image);
        true
    }

    /// The uploaded photo, if any.
    pub fn original(&self) -> Option<&PreparedImage> {
        self.original.as_ref()
    }

    /// The background-removed cutout, if it has arrived.
    pub fn cutout(&self) -> Option<&PreparedImage> {
        self.cutout.as_ref()
    }

    /// Natural size of the uploaded photo.
    pub fn natural_size(&self) -> Option<PixelSize> {
        self.original.as_ref().map(PreparedImage::size)
    }

    /// Install a generated background for the place-cutout flow and seed the
    /// cutout placement with the default initial size.
    pub fn set_background(&mut self, image: PreparedImage) {
        self.background = Some(image);
        if self.cutout_placement.is_none()
            && let Some(cutout) = &self.cutout
        {
            self.cutout_placement = Some(PlacementRect::initial_for(cutout.size()));
        }
    }

    /// The generated background, if any.
    pub fn background(&self) -> Option<&PreparedImage> {
        self.background.as_ref()
    }

    /// Current cutout placement over the generated background.
    pub fn cutout_placement(&self) -> Option<PlacementRect> {
        self.cutout_placement
    }

    /// Replace the cutout placement.
    pub fn set_cutout_placement(&mut self, rect: PlacementRect) {
        self.cutout_placement = Some(rect);
    }

    /// Add a text layer at the container center with the given style.
    pub fn apply_text(&mut self, text: &str, style: TextStyle) -> UnderlayResult<LayerId> {
        self.apply_text_at(text, PercentPoint::CENTER, style)
    }

    /// Add a text layer at an explicit position.
    ///
    /// Empty or whitespace-only text is rejected; the editor disables the
    /// apply control in that state and the engine enforces the same rule.
    pub fn apply_text_at(
        &mut self,
        text: &str,
        position: PercentPoint,
        style: TextStyle,
    ) -> UnderlayResult<LayerId> {
        if text.trim().is_empty() {
            return Err(UnderlayError::validation("layer text must be non-empty"));
        }
        self.next_layer_id += 1;
        let id = LayerId(self.next_layer_id);
        self.layers.push(TextLayer {
            id,
            text: text.to_owned(),
            position,
            style,
        });
        Ok(id)
    }

    /// Text layers in insertion order (bottom to top).
    pub fn layers(&self) -> &[TextLayer] {
        &self.layers
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> UnderlayResult<&mut TextLayer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| UnderlayError::validation(format!("no text layer with id {}", id.0)))
    }

    /// Replace a layer's text.
    pub fn update_text(&mut self, id: LayerId, text: &str) -> UnderlayResult<()> {
        if text.trim().is_empty() {
            return Err(UnderlayError::validation("layer text must be non-empty"));
        }
        self.layer_mut(id)?.text = text.to_owned();
        Ok(())
    }

    /// Replace a layer's style.
    pub fn update_style(&mut self, id: LayerId, style: TextStyle) -> UnderlayResult<()> {
        self.layer_mut(id)?.style = style;
        Ok(())
    }

    /// Replace a layer's position (already clamped by construction).
    pub fn update_position(&mut self, id: LayerId, position: PercentPoint) -> UnderlayResult<()> {
        self.layer_mut(id)?.position = position;
        Ok(())
    }

    /// Remove a layer; clears the selection when the selected layer goes.
    pub fn remove_layer(&mut self, id: LayerId) -> UnderlayResult<()> {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        if self.layers.len() == before {
            return Err(UnderlayError::validation(format!(
                "no text layer with id {}",
                id.0
            )));
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Remove every layer and clear the selection in one step.
    pub fn clear_layers(&mut self) {
        self.layers.clear();
        self.selected = None;
    }

    /// Select a layer; at most one layer is selected at a time.
    pub fn select(&mut self, id: LayerId) -> UnderlayResult<()> {
        if self.layer(id).is_none() {
            return Err(UnderlayError::validation(format!(
                "no text layer with id {}",
                id.0
            )));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// The selected layer id, if any.
    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/session.rs"]
mod tests;
