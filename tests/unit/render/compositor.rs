use super::*;

#[test]
fn premul_over_transparent_src_is_identity() {
    let mut dst = vec![10, 20, 30, 255, 1, 2, 3, 4];
    let src = vec![0u8; 8];
    premul_over_in_place(&mut dst, &src).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255, 1, 2, 3, 4]);
}

#[test]
fn premul_over_opaque_src_replaces_dst() {
    let mut dst = vec![10, 20, 30, 255];
    let src = vec![100, 150, 200, 255];
    premul_over_in_place(&mut dst, &src).unwrap();
    assert_eq!(dst, vec![100, 150, 200, 255]);
}

#[test]
fn premul_over_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(premul_over_in_place(&mut dst, &[0u8; 4]).is_err());
    let mut odd = vec![0u8; 6];
    assert!(premul_over_in_place(&mut odd, &[0u8; 6]).is_err());
}

#[test]
fn opacity_zero_draws_nothing_and_one_matches_plain_over() {
    let src = vec![100, 150, 200, 255];

    let mut untouched = vec![10, 20, 30, 255];
    premul_over_in_place_opacity(&mut untouched, &src, 0.0).unwrap();
    assert_eq!(untouched, vec![10, 20, 30, 255]);

    let mut a = vec![10, 20, 30, 255];
    let mut b = vec![10, 20, 30, 255];
    premul_over_in_place_opacity(&mut a, &src, 1.0).unwrap();
    premul_over_in_place(&mut b, &src).unwrap();
    assert_eq!(a, b);
}

#[test]
fn half_opacity_halves_source_contribution() {
    let mut dst = vec![0, 0, 0, 0];
    let src = vec![200, 100, 50, 255];
    premul_over_in_place_opacity(&mut dst, &src, 0.5).unwrap();
    assert!(dst[3] >= 127 && dst[3] <= 129, "alpha was {}", dst[3]);
    assert!(dst[0] >= 99 && dst[0] <= 101, "red was {}", dst[0]);
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_transparent() {
    let mut px = vec![200, 100, 50, 255, 0, 0, 0, 0];
    let original = px.clone();
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, original);
}

#[test]
fn unpremultiply_recovers_half_alpha_within_rounding() {
    let mut px = vec![200, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert!((i16::from(px[0]) - 200).abs() <= 2);
    assert!((i16::from(px[1]) - 100).abs() <= 2);
    assert!((i16::from(px[2]) - 50).abs() <= 2);
    assert_eq!(px[3], 128);
}

#[test]
fn gaussian_kernel_is_normalized_in_q16() {
    let k = gaussian_kernel_q16(5, 2.5).unwrap();
    assert_eq!(k.len(), 11);
    assert_eq!(k.iter().map(|&w| u64::from(w)).sum::<u64>(), 65536);

    assert_eq!(gaussian_kernel_q16(0, 1.0).unwrap(), vec![1 << 16]);
    assert!(gaussian_kernel_q16(3, 0.0).is_err());
}

#[test]
fn blur_preserves_a_uniform_field() {
    let w = 8u32;
    let h = 8u32;
    let src = vec![120u8; (w * h * 4) as usize];
    let mut dst = vec![0u8; src.len()];
    let mut tmp = vec![0u8; src.len()];
    let k = gaussian_kernel_q16(2, 1.0).unwrap();
    blur_rgba8_premul_q16(&src, &mut dst, &mut tmp, w, h, &k);
    for &b in &dst {
        assert!((i16::from(b) - 120).abs() <= 1);
    }
}

#[test]
fn oversized_images_are_rejected() {
    assert!(dims_u16(PixelSize::new(70_000, 10).unwrap()).is_err());
    assert!(dims_u16(PixelSize::new(640, 480).unwrap()).is_ok());
}

#[test]
fn decode_image_premultiplies_and_reports_size() {
    // Encode a 2x1 RGBA PNG with one semi-transparent pixel.
    let mut png = std::io::Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut png,
        &[255, 0, 0, 255, 255, 255, 255, 128],
        2,
        1,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();

    let prepared = decode_image(&png.into_inner()).unwrap();
    assert_eq!(prepared.size(), PixelSize::new(2, 1).unwrap());
    // Second pixel premultiplied: 255 * 128/255 ~= 128.
    assert!(prepared.data()[4] >= 127 && prepared.data()[4] <= 129);
    assert_eq!(prepared.data()[7], 128);
}

#[test]
fn decode_rejects_garbage_bytes() {
    assert!(matches!(
        decode_image(b"not an image"),
        Err(UnderlayError::Load(_))
    ));
}

#[test]
fn flat_raster_encodes_to_a_decodable_png() {
    let raster = FlatRaster {
        size: PixelSize::new(3, 2).unwrap(),
        rgba8: vec![7u8; 24],
    };
    let png = raster.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3, 2));
}
