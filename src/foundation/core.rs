use crate::foundation::error::{UnderlayError, UnderlayResult};

pub use kurbo::{Point, Rect, Vec2};

/// Preview containers never grow taller than this, matching the editor shell.
pub(crate) const MAX_CONTAINER_HEIGHT_PX: f64 = 600.0;

/// Natural pixel dimensions of a decoded image.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Create a validated size with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> UnderlayResult<Self> {
        if width == 0 || height == 0 {
            return Err(UnderlayError::validation("image dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Width over height.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// On-screen size of the preview container in CSS pixels.
///
/// The container's width follows the viewport; its height is locked to the
/// original image's aspect ratio. Text positions are stored relative to this
/// box, not to the image's natural pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerSize {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl ContainerSize {
    /// Create a validated container size.
    pub fn new(width: f64, height: f64) -> UnderlayResult<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(UnderlayError::validation(
                "container size must be finite and > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Derive the container box from the image's natural size and the width
    /// available in the page, preserving aspect ratio and capping height.
    pub fn from_available_width(natural: PixelSize, available_width: f64) -> UnderlayResult<Self> {
        if !available_width.is_finite() || available_width <= 0.0 {
            return Err(UnderlayError::validation(
                "available width must be finite and > 0",
            ));
        }
        let mut width = available_width;
        let mut height = width / natural.aspect_ratio();
        if height > MAX_CONTAINER_HEIGHT_PX {
            height = MAX_CONTAINER_HEIGHT_PX;
            width = height * natural.aspect_ratio();
        }
        Self::new(width, height)
    }
}

/// A position in percent space, relative to the container's content box.
///
/// Both coordinates are always inside `[0, 100]`; construction, every
/// mutation, and deserialization clamp.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PercentPoint {
    /// Horizontal position, `0` = left edge, `100` = right edge.
    pub x: f64,
    /// Vertical position, `0` = top edge, `100` = bottom edge.
    pub y: f64,
}

impl<'de> serde::Deserialize<'de> for PercentPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 2]),
            Obj { x: f64, y: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y]) => Ok(Self::new(x, y)),
            Repr::Obj { x, y } => Ok(Self::new(x, y)),
        }
    }
}

impl PercentPoint {
    /// The container center.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// Create a clamped percent position.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Offset by percent deltas, clamping the result back into `[0, 100]`.
    pub fn offset_by(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) }
}

/// Convert a percent-space position to natural pixel coordinates.
///
/// This is the single documented conversion between the two coordinate
/// spaces; both the live preview and the export path go through it so they
/// cannot drift apart.
pub fn to_natural_pixels(pos: PercentPoint, natural: PixelSize) -> Point {
    Point::new(
        pos.x / 100.0 * f64::from(natural.width),
        pos.y / 100.0 * f64::from(natural.height),
    )
}

/// Ratio by which pixel-space style values (font size, shadow, stroke) are
/// scaled at export time so the flattened output matches the on-screen
/// proportions regardless of preview zoom.
pub fn export_scale_factor(natural: PixelSize, container_width_at_edit: f64) -> UnderlayResult<f64> {
    if !container_width_at_edit.is_finite() || container_width_at_edit <= 0.0 {
        return Err(UnderlayError::validation(
            "container width at edit time must be finite and > 0",
        ));
    }
    Ok(f64::from(natural.width) / container_width_at_edit)
}

/// `object-fit: contain` placement of an image inside a container box.
///
/// Returns the rect the image occupies in container coordinates; the image is
/// centered on the axis it does not fill.
pub(crate) fn fit_contain(natural: PixelSize, container: ContainerSize) -> Rect {
    let scale = (container.width / f64::from(natural.width))
        .min(container.height / f64::from(natural.height));
    let w = f64::from(natural.width) * scale;
    let h = f64::from(natural.height) * scale;
    let x = (container.width - w) / 2.0;
    let y = (container.height - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let mul = |c: u8| crate::foundation::math::mul_div255_u8(u16::from(c), u16::from(a));
        Self {
            r: mul(r),
            g: mul(g),
            b: mul(b),
            a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
