use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{UnderlayError, UnderlayResult};
use crate::scene::layer::TextStyle;

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Font bytes keyed by the family names the style editor offers.
///
/// The first registered family doubles as the fallback for unknown names, so
/// a style carrying a family the host never provided still renders instead of
/// failing the export.
#[derive(Clone, Debug, Default)]
pub struct FontStore {
    families: Vec<(String, Arc<Vec<u8>>)>,
}

impl FontStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw font bytes under a family name. Re-registering a family
    /// replaces its bytes.
    pub fn register(&mut self, family: impl Into<String>, bytes: Vec<u8>) {
        let family = family.into();
        let bytes = Arc::new(bytes);
        match self
            .families
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&family))
        {
            Some(slot) => slot.1 = bytes,
            None => self.families.push((family, bytes)),
        }
    }

    /// Number of registered families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether no family has been registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Resolve a requested family to a registered one, falling back to the
    /// first registered family. Errors only when the store is empty.
    pub(crate) fn resolve(&self, family: &str) -> UnderlayResult<(&str, &Arc<Vec<u8>>)> {
        self.families
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(family))
            .or_else(|| self.families.first())
            .map(|(name, bytes)| (name.as_str(), bytes))
            .ok_or_else(|| {
                UnderlayError::validation(format!(
                    "no fonts registered (requested family \"{family}\")"
                ))
            })
    }
}

/// Style values that scale linearly from container space to natural pixels at
/// export time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScaledTextStyle {
    pub(crate) font_size_px: f64,
    pub(crate) shadow_blur_px: f64,
    pub(crate) shadow_offset_x_px: f64,
    pub(crate) shadow_offset_y_px: f64,
    pub(crate) stroke_width_px: f64,
}

/// Apply the export scale factor to every pixel-valued style field, so the
/// flattened output keeps the on-screen proportions regardless of how wide
/// the preview happened to be while editing.
pub(crate) fn scale_for_export(style: &TextStyle, scale: f64) -> ScaledTextStyle {
    ScaledTextStyle {
        font_size_px: style.font_size_px * scale,
        shadow_blur_px: style.shadow.blur_px * scale,
        shadow_offset_x_px: style.shadow.offset_x_px * scale,
        shadow_offset_y_px: style.shadow.offset_y_px * scale,
        stroke_width_px: style.stroke.width_px * scale,
    }
}

/// Stateful helper for shaping single-line layer text with Parley.
pub(crate) struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    // Family key (lowercased) -> name Parley registered the bytes under.
    registered: HashMap<String, String>,
}

impl TextShaper {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn ensure_family(&mut self, family: &str, font_bytes: &[u8]) -> UnderlayResult<String> {
        let key = family.to_ascii_lowercase();
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            UnderlayError::validation(format!(
                "no font families registered from bytes for \"{family}\""
            ))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| UnderlayError::validation("registered font family has no name"))?
            .to_string();

        self.registered.insert(key, name.clone());
        Ok(name)
    }

    /// Shape and lay out one line of text.
    ///
    /// Returns the Parley layout plus the font handed to the rasterizer; both
    /// are built from the same bytes so shaping and painting cannot disagree.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        family: &str,
        size_px: f32,
        weight: f32,
        brush: TextBrushRgba8,
    ) -> UnderlayResult<(
        parley::Layout<TextBrushRgba8>,
        vello_cpu::peniko::FontData,
    )> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(UnderlayError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.ensure_family(family, font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(weight),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        // Layer text is a single nowrap line; no max width.
        layout.break_all_lines(None);

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes.to_vec()), 0);
        Ok((layout, font))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
