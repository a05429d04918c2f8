use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{UnderlayError, UnderlayResult};

/// Straight-alpha RGBA8 color parsed from a CSS color string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from channels.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to premultiplied form.
    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Parse the CSS color forms the editor produces: `#rgb`, `#rrggbb`,
    /// `#rrggbbaa`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
    pub fn parse_css(s: &str) -> UnderlayResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(body) = strip_fn(s, "rgba") {
            return parse_rgb_fn(body, true);
        }
        if let Some(body) = strip_fn(s, "rgb") {
            return parse_rgb_fn(body, false);
        }
        Err(UnderlayError::validation(format!(
            "unsupported css color \"{s}\""
        )))
    }
}

fn strip_fn<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(name)?.trim_start();
    rest.strip_prefix('(')?.trim_end().strip_suffix(')')
}

fn parse_hex(hex: &str) -> UnderlayResult<Rgba8> {
    fn byte(pair: &str) -> UnderlayResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| UnderlayError::validation(format!("invalid hex byte \"{pair}\"")))
    }
    fn nibble(ch: &str) -> UnderlayResult<u8> {
        let v = u8::from_str_radix(ch, 16)
            .map_err(|_| UnderlayError::validation(format!("invalid hex digit \"{ch}\"")))?;
        Ok(v * 17)
    }

    match hex.len() {
        3 => Ok(Rgba8 {
            r: nibble(&hex[0..1])?,
            g: nibble(&hex[1..2])?,
            b: nibble(&hex[2..3])?,
            a: 255,
        }),
        6 => Ok(Rgba8 {
            r: byte(&hex[0..2])?,
            g: byte(&hex[2..4])?,
            b: byte(&hex[4..6])?,
            a: 255,
        }),
        8 => Ok(Rgba8 {
            r: byte(&hex[0..2])?,
            g: byte(&hex[2..4])?,
            b: byte(&hex[4..6])?,
            a: byte(&hex[6..8])?,
        }),
        _ => Err(UnderlayError::validation(
            "hex color must be #rgb, #rrggbb or #rrggbbaa",
        )),
    }
}

fn parse_rgb_fn(body: &str, with_alpha: bool) -> UnderlayResult<Rgba8> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(UnderlayError::validation(format!(
            "expected {expected} components in rgb() color, got {}",
            parts.len()
        )));
    }

    fn channel(s: &str) -> UnderlayResult<u8> {
        let v: f64 = s
            .parse()
            .map_err(|_| UnderlayError::validation(format!("invalid color channel \"{s}\"")))?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    }

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if with_alpha {
        let v: f64 = parts[3]
            .parse()
            .map_err(|_| UnderlayError::validation(format!("invalid alpha \"{}\"", parts[3])))?;
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };
    Ok(Rgba8 { r, g, b, a })
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
