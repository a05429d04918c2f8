use super::*;
use crate::scene::layer::{TextShadow, TextStroke};

fn style(font_size_px: f64) -> TextStyle {
    TextStyle {
        font_size_px,
        shadow: TextShadow {
            blur_px: 5.0,
            offset_x_px: 2.0,
            offset_y_px: 2.0,
            ..TextShadow::default()
        },
        stroke: TextStroke {
            width_px: 2.0,
            ..TextStroke::default()
        },
        ..TextStyle::default()
    }
}

#[test]
fn export_scaling_is_linear_in_every_pixel_field() {
    // Container width W, natural width 2W: everything doubles.
    let scaled = scale_for_export(&style(10.0), 2.0);
    assert_eq!(scaled.font_size_px, 20.0);
    assert_eq!(scaled.shadow_blur_px, 10.0);
    assert_eq!(scaled.shadow_offset_x_px, 4.0);
    assert_eq!(scaled.shadow_offset_y_px, 4.0);
    assert_eq!(scaled.stroke_width_px, 4.0);
}

#[test]
fn export_scale_of_one_is_identity() {
    let scaled = scale_for_export(&style(32.0), 1.0);
    assert_eq!(scaled.font_size_px, 32.0);
    assert_eq!(scaled.shadow_blur_px, 5.0);
}

#[test]
fn font_store_resolves_case_insensitively() {
    let mut store = FontStore::new();
    store.register("Roboto Mono", vec![1, 2, 3]);
    let (name, bytes) = store.resolve("roboto mono").unwrap();
    assert_eq!(name, "Roboto Mono");
    assert_eq!(bytes.as_slice(), &[1, 2, 3]);
}

#[test]
fn font_store_falls_back_to_the_first_family() {
    let mut store = FontStore::new();
    store.register("Arial", vec![1]);
    store.register("Georgia", vec![2]);
    let (name, _) = store.resolve("Comic Sans MS").unwrap();
    assert_eq!(name, "Arial");
}

#[test]
fn empty_font_store_is_an_error() {
    let store = FontStore::new();
    assert!(store.resolve("Arial").is_err());
}

#[test]
fn reregistering_a_family_replaces_its_bytes() {
    let mut store = FontStore::new();
    store.register("Arial", vec![1]);
    store.register("arial", vec![9]);
    assert_eq!(store.len(), 1);
    let (_, bytes) = store.resolve("Arial").unwrap();
    assert_eq!(bytes.as_slice(), &[9]);
}
