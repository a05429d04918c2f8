use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::color::Rgba8;
use crate::foundation::core::{ContainerSize, PixelSize, export_scale_factor, to_natural_pixels};
use crate::foundation::error::{UnderlayError, UnderlayResult};
use crate::input::placement::PlacementRect;
use crate::render::text::{
    FontStore, ScaledTextStyle, TextBrushRgba8, TextShaper, scale_for_export,
};
use crate::scene::layer::TextLayer;
use crate::scene::session::PreparedImage;

/// Filename template for the text-behind export.
pub const TEXT_BEHIND_FILENAME: &str = "text-behind-image.png";

/// Inputs to one flatten pass.
///
/// `container_width_at_edit` is the on-screen container width at the moment
/// the user hit download; it anchors the container-space-to-natural-pixels
/// scale for every pixel-valued style field.
#[derive(Clone, Copy, Debug)]
pub struct FlattenRequest<'a> {
    /// The uploaded photo; its natural size decides the output size.
    pub original: &'a PreparedImage,
    /// The background-removed cutout, drawn above everything.
    pub cutout: &'a PreparedImage,
    /// Text layers, bottom to top.
    pub layers: &'a [TextLayer],
    /// Container width while editing, in CSS pixels.
    pub container_width_at_edit: f64,
}

/// A flattened composition in straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRaster {
    /// Output dimensions (the original photo's natural size).
    pub size: PixelSize,
    /// Row-major straight-alpha RGBA8 bytes.
    pub rgba8: Vec<u8>,
}

impl FlatRaster {
    /// Encode to PNG bytes for download.
    pub fn encode_png(&self) -> UnderlayResult<Vec<u8>> {
        let mut out = std::io::Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut out,
            &self.rgba8,
            self.size.width,
            self.size.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| UnderlayError::encoding(format!("png encode failed: {e}")))?;
        Ok(out.into_inner())
    }
}

/// Decode encoded image bytes (PNG/JPEG/WebP) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> UnderlayResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| UnderlayError::load(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let size = PixelSize::new(width, height).map_err(|_| UnderlayError::load("empty image"))?;

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PreparedImage::from_premul_parts(size, rgba8_premul)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BlurKernelKey {
    radius_px: u32,
    sigma_bits: u32,
}

/// Deterministic renderer for the layer stack.
///
/// Holds the font store and reusable rasterization state; `flatten` itself is
/// pure given its inputs — identical requests produce identical pixels.
pub struct Compositor {
    fonts: FontStore,
    shaper: TextShaper,
    ctx: Option<vello_cpu::RenderContext>,
    blur_kernel_cache: HashMap<BlurKernelKey, Arc<Vec<u32>>>,
    blur_scratch_a: Vec<u8>,
    blur_scratch_b: Vec<u8>,
}

impl Compositor {
    /// Create a compositor rendering text through `fonts`.
    pub fn new(fonts: FontStore) -> Self {
        Self {
            fonts,
            shaper: TextShaper::new(),
            ctx: None,
            blur_kernel_cache: HashMap::new(),
            blur_scratch_a: Vec::new(),
            blur_scratch_b: Vec::new(),
        }
    }

    /// Mutable access to the font store, for registering families.
    pub fn fonts_mut(&mut self) -> &mut FontStore {
        &mut self.fonts
    }

    /// Flatten the layer stack onto one surface at the photo's natural size.
    ///
    /// Draw order is fixed and is the sole determinant of stacking: original
    /// at 1:1, each text layer in array order, cutout scaled to natural size
    /// on top. Failure leaves no partial output behind.
    #[tracing::instrument(skip_all, fields(layers = req.layers.len()))]
    pub fn flatten(&mut self, req: &FlattenRequest<'_>) -> UnderlayResult<FlatRaster> {
        let natural = req.original.size();
        let scale = export_scale_factor(natural, req.container_width_at_edit)?;
        let (w, h) = dims_u16(natural)?;

        let mut dst = vello_cpu::Pixmap::new(w, h);
        let mut tmp = vello_cpu::Pixmap::new(w, h);

        // 1. Base photo at 1:1.
        let base_paint = image_paint(req.original)?;
        self.render_pass(&mut dst, |_, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(base_paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(natural.width),
                f64::from(natural.height),
            ));
            Ok(())
        })?;

        // 2. Text layers in array order. Each layer renders into its own
        // scratch passes, so one layer's shadow or stroke never leaks into
        // the next.
        for layer in req.layers {
            self.draw_text_layer(layer, natural, scale, &mut dst, &mut tmp)?;
        }

        // 3. Cutout on top, scaled to natural size.
        let cutout_paint = image_paint(req.cutout)?;
        let cutout_size = req.cutout.size();
        clear_pixmap_to_transparent(&mut tmp);
        self.render_pass(&mut tmp, |_, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(
                f64::from(natural.width) / f64::from(cutout_size.width),
                f64::from(natural.height) / f64::from(cutout_size.height),
            ));
            ctx.set_paint(cutout_paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(cutout_size.width),
                f64::from(cutout_size.height),
            ));
            Ok(())
        })?;
        premul_over_in_place(dst.data_as_u8_slice_mut(), tmp.data_as_u8_slice())?;

        let mut rgba8 = dst.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba8);
        Ok(FlatRaster {
            size: natural,
            rgba8,
        })
    }

    /// Flatten straight to PNG bytes.
    pub fn flatten_png(&mut self, req: &FlattenRequest<'_>) -> UnderlayResult<Vec<u8>> {
        self.flatten(req)?.encode_png()
    }

    /// Flatten the place-cutout-over-generated-background composition.
    ///
    /// The background draws at its natural size; the cutout draws at the
    /// placement rect, converted from container space to natural pixels.
    #[tracing::instrument(skip_all)]
    pub fn flatten_over_background(
        &mut self,
        background: &PreparedImage,
        cutout: &PreparedImage,
        placement: PlacementRect,
        container: ContainerSize,
    ) -> UnderlayResult<FlatRaster> {
        let natural = background.size();
        let (w, h) = dims_u16(natural)?;
        let scale_x = f64::from(natural.width) / container.width;
        let scale_y = f64::from(natural.height) / container.height;

        let mut dst = vello_cpu::Pixmap::new(w, h);
        let mut tmp = vello_cpu::Pixmap::new(w, h);

        let bg_paint = image_paint(background)?;
        self.render_pass(&mut dst, |_, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(bg_paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(natural.width),
                f64::from(natural.height),
            ));
            Ok(())
        })?;

        let cut_size = cutout.size();
        let cut_paint = image_paint(cutout)?;
        let transform = vello_cpu::kurbo::Affine::translate((
            placement.x * scale_x,
            placement.y * scale_y,
        )) * vello_cpu::kurbo::Affine::scale_non_uniform(
            placement.width * scale_x / f64::from(cut_size.width),
            placement.height * scale_y / f64::from(cut_size.height),
        );
        clear_pixmap_to_transparent(&mut tmp);
        self.render_pass(&mut tmp, |_, ctx| {
            ctx.set_transform(transform);
            ctx.set_paint(cut_paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(cut_size.width),
                f64::from(cut_size.height),
            ));
            Ok(())
        })?;
        premul_over_in_place(dst.data_as_u8_slice_mut(), tmp.data_as_u8_slice())?;

        let mut rgba8 = dst.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba8);
        Ok(FlatRaster {
            size: natural,
            rgba8,
        })
    }

    fn draw_text_layer(
        &mut self,
        layer: &TextLayer,
        natural: PixelSize,
        scale: f64,
        dst: &mut vello_cpu::Pixmap,
        tmp: &mut vello_cpu::Pixmap,
    ) -> UnderlayResult<()> {
        let scaled = scale_for_export(&layer.style, scale);
        let fill = Rgba8::parse_css(&layer.style.color)?;
        let stroke = layer
            .style
            .stroke
            .enabled
            .then(|| Rgba8::parse_css(&layer.style.stroke.color))
            .transpose()?;
        let shadow = layer
            .style
            .shadow
            .enabled
            .then(|| Rgba8::parse_css(&layer.style.shadow.color))
            .transpose()?;
        let opacity = layer.style.opacity.clamp(0.0, 1.0) as f32;

        let (family, font_bytes) = {
            let (family, bytes) = self.fonts.resolve(&layer.style.font_family)?;
            (family.to_owned(), Arc::clone(bytes))
        };
        let (layout, font) = self.shaper.layout_plain(
            &layer.text,
            &font_bytes,
            &family,
            scaled.font_size_px as f32,
            layer.style.font_weight.to_numeric(),
            TextBrushRgba8 {
                r: fill.r,
                g: fill.g,
                b: fill.b,
                a: fill.a,
            },
        )?;

        // Center/middle anchor: the percent position names the middle of the
        // laid-out text block.
        let anchor = to_natural_pixels(layer.position, natural);
        let origin_x = anchor.x - f64::from(layout.width()) / 2.0;
        let origin_y = anchor.y - f64::from(layout.height()) / 2.0;

        if let Some(shadow_color) = shadow {
            clear_pixmap_to_transparent(tmp);
            let shadow_origin = (
                origin_x + scaled.shadow_offset_x_px,
                origin_y + scaled.shadow_offset_y_px,
            );
            self.render_pass(tmp, |_, ctx| {
                ctx.set_transform(vello_cpu::kurbo::Affine::translate(shadow_origin));
                draw_glyphs(ctx, &layout, &font, Some(shadow_color), GlyphPass::Fill);
                Ok(())
            })?;
            self.blur_in_place(tmp, scaled)?;
            premul_over_in_place_opacity(dst.data_as_u8_slice_mut(), tmp.data_as_u8_slice(), opacity)?;
        }

        clear_pixmap_to_transparent(tmp);
        let stroke_width = stroke.map(|_| scaled.stroke_width_px);
        self.render_pass(tmp, |_, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin_x, origin_y)));
            if let (Some(stroke_color), Some(width)) = (stroke, stroke_width) {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
                draw_glyphs(ctx, &layout, &font, Some(stroke_color), GlyphPass::Stroke);
            }
            // The fill pass takes its color from the layout brush.
            draw_glyphs(ctx, &layout, &font, None, GlyphPass::Fill);
            Ok(())
        })?;
        premul_over_in_place_opacity(dst.data_as_u8_slice_mut(), tmp.data_as_u8_slice(), opacity)
    }

    fn blur_in_place(
        &mut self,
        pixmap: &mut vello_cpu::Pixmap,
        scaled: ScaledTextStyle,
    ) -> UnderlayResult<()> {
        let radius = scaled.shadow_blur_px.round().clamp(0.0, 254.0) as u32;
        if radius == 0 {
            return Ok(());
        }
        // Canvas shadowBlur maps to a Gaussian with sigma of roughly half the
        // blur distance.
        let sigma = (scaled.shadow_blur_px * 0.5).max(0.1) as f32;

        let key = BlurKernelKey {
            radius_px: radius,
            sigma_bits: sigma.to_bits(),
        };
        let kernel = if let Some(k) = self.blur_kernel_cache.get(&key).cloned() {
            k
        } else {
            let k = Arc::new(gaussian_kernel_q16(radius, sigma)?);
            self.blur_kernel_cache.insert(key, Arc::clone(&k));
            k
        };

        let pixmap_width = u32::from(pixmap.width());
        let pixmap_height = u32::from(pixmap.height());
        let bytes = pixmap.data_as_u8_slice_mut();
        self.blur_scratch_a.resize(bytes.len(), 0);
        self.blur_scratch_b.resize(bytes.len(), 0);
        self.blur_scratch_b.copy_from_slice(bytes);
        blur_rgba8_premul_q16(
            &self.blur_scratch_b,
            bytes,
            &mut self.blur_scratch_a,
            pixmap_width,
            pixmap_height,
            &kernel,
        );
        Ok(())
    }

    fn render_pass(
        &mut self,
        dst: &mut vello_cpu::Pixmap,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> UnderlayResult<()>,
    ) -> UnderlayResult<()> {
        let width = dst.width();
        let height = dst.height();
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let result = f(self, &mut ctx);
        if result.is_ok() {
            ctx.flush();
            ctx.render_to_pixmap(dst);
        }
        self.ctx = Some(ctx);
        result
    }
}

#[derive(Clone, Copy)]
enum GlyphPass {
    Fill,
    Stroke,
}

fn draw_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    override_color: Option<Rgba8>,
    pass: GlyphPass,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            let color = override_color.unwrap_or(Rgba8 {
                r: brush.r,
                g: brush.g,
                b: brush.b,
                a: brush.a,
            });
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                color.r, color.g, color.b, color.a,
            ));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            let builder = ctx.glyph_run(font).font_size(run.run().font_size());
            match pass {
                GlyphPass::Fill => builder.fill_glyphs(glyphs),
                GlyphPass::Stroke => builder.stroke_glyphs(glyphs),
            }
        }
    }
}

fn dims_u16(size: PixelSize) -> UnderlayResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| UnderlayError::validation("image width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| UnderlayError::validation("image height exceeds u16"))?;
    Ok((w, h))
}

fn image_paint(image: &PreparedImage) -> UnderlayResult<vello_cpu::Image> {
    let (w, h) = dims_u16(image.size())?;
    let bytes = image.data();
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (image.size().width as usize) * (image.size().height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        let un = |c: u8| -> u8 { ((u16::from(c) * 255 + a / 2) / a).min(255) as u8 };
        px[0] = un(px[0]);
        px[1] = un(px[1]);
        px[2] = un(px[2]);
    }
}

pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> UnderlayResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(UnderlayError::validation(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3] as u16;
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = (sa as u8).saturating_add(mul_div255(d[3] as u16, inv));
        for c in 0..3 {
            d[c] = s[c].saturating_add(mul_div255(d[c] as u16, inv));
        }
    }
    Ok(())
}

pub(crate) fn premul_over_in_place_opacity(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
) -> UnderlayResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(UnderlayError::validation(
            "premul_over_in_place_opacity expects equal-length rgba8 buffers",
        ));
    }
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return Ok(());
    }
    if op == 255 {
        return premul_over_in_place(dst, src);
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);
        d[3] = sa.saturating_add(mul_div255(d[3] as u16, inv));
        for c in 0..3 {
            let sc = mul_div255(u16::from(s[c]), op);
            d[c] = sc.saturating_add(mul_div255(d[c] as u16, inv));
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    crate::foundation::math::mul_div255_u8(x, y)
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> UnderlayResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(UnderlayError::validation("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(UnderlayError::validation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Force the kernel to sum to exactly 1.0 in Q16 so blurring preserves
    // total energy; rounding drift lands on the center tap.
    let delta = 65536i64 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let mid_val = i64::from(weights[mid]);
        weights[mid] = (mid_val + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

pub(crate) fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    tmp: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }

    horizontal_blur_q16(src, tmp, width, height, kernel_q16);
    vertical_blur_q16(tmp, dst, width, height, kernel_q16);
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let dx = ki as i32 - radius;
                let sx = (x + dx).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let dy = ki as i32 - radius;
                let sy = (y + dy).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
