use crate::foundation::core::PercentPoint;
use serde::{Deserialize, Serialize};

/// Font families offered by the style editor.
pub const FONT_FAMILIES: [&str; 6] = [
    "Arial",
    "Times New Roman",
    "Helvetica",
    "Georgia",
    "Verdana",
    "Courier New",
];

/// Interactive font-size slider range in pixels.
pub const FONT_SIZE_RANGE_PX: (f64, f64) = (12.0, 200.0);

/// Stable identifier of a text layer within one session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LayerId(pub u64);

/// CSS-style font weight keywords supported by the editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
    /// Lighter than the inherited weight.
    Lighter,
    /// Bolder than the inherited weight.
    Bolder,
}

impl FontWeight {
    /// Numeric weight used when shaping text.
    pub(crate) fn to_numeric(self) -> f32 {
        match self {
            Self::Normal => 400.0,
            Self::Bold => 700.0,
            Self::Lighter => 300.0,
            Self::Bolder => 800.0,
        }
    }
}

/// Drop-shadow settings for a text layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextShadow {
    /// Whether the shadow is drawn at all.
    pub enabled: bool,
    /// Shadow color as a CSS color string.
    pub color: String,
    /// Blur radius in container pixels.
    pub blur_px: f64,
    /// Horizontal offset in container pixels.
    pub offset_x_px: f64,
    /// Vertical offset in container pixels.
    pub offset_y_px: f64,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "rgba(0, 0, 0, 0.5)".to_owned(),
            blur_px: 5.0,
            offset_x_px: 2.0,
            offset_y_px: 2.0,
        }
    }
}

/// Outline stroke settings for a text layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStroke {
    /// Whether the stroke is drawn at all.
    pub enabled: bool,
    /// Stroke color as a CSS color string.
    pub color: String,
    /// Stroke width in container pixels.
    pub width_px: f64,
}

impl Default for TextStroke {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#ffffff".to_owned(),
            width_px: 2.0,
        }
    }
}

/// Visual styling of a text layer.
///
/// All pixel-valued fields are in container space; the export path scales
/// them to natural pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in container pixels, always > 0.
    pub font_size_px: f64,
    /// Font family name, resolved through the session's font store at render.
    pub font_family: String,
    /// Font weight keyword.
    pub font_weight: FontWeight,
    /// Fill color as a CSS color string.
    pub color: String,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f64,
    /// Drop shadow.
    pub shadow: TextShadow,
    /// Outline stroke.
    pub stroke: TextStroke,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size_px: 32.0,
            font_family: "Roboto Mono".to_owned(),
            font_weight: FontWeight::Normal,
            color: "#ffffff".to_owned(),
            opacity: 1.0,
            shadow: TextShadow::default(),
            stroke: TextStroke::default(),
        }
    }
}

/// One text layer in the composited stack.
///
/// Z-order is implicit: the base photo is always below every text layer, the
/// cutout always above, and text layers stack in insertion order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    /// Stable id assigned by the session.
    pub id: LayerId,
    /// Layer text. Never empty once applied.
    pub text: String,
    /// Anchor position in percent space (center/middle anchored).
    pub position: PercentPoint,
    /// Visual styling.
    pub style: TextStyle,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
