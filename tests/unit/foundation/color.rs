use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(Rgba8::parse_css("#ffffff").unwrap(), Rgba8::rgb(255, 255, 255));
    assert_eq!(Rgba8::parse_css("#f00").unwrap(), Rgba8::rgb(255, 0, 0));
    let c = Rgba8::parse_css("#0000ff80").unwrap();
    assert_eq!((c.b, c.a), (255, 128));
}

#[test]
fn parses_rgb_function_forms() {
    assert_eq!(
        Rgba8::parse_css("rgb(255, 128, 0)").unwrap(),
        Rgba8::rgb(255, 128, 0)
    );
    let c = Rgba8::parse_css("rgba(0, 0, 0, 0.5)").unwrap();
    assert_eq!(c.a, 128);
}

#[test]
fn rejects_unknown_forms() {
    assert!(Rgba8::parse_css("tomato").is_err());
    assert!(Rgba8::parse_css("#12345").is_err());
    assert!(Rgba8::parse_css("rgb(1, 2)").is_err());
}

#[test]
fn premul_halves_channels_at_half_alpha() {
    let p = Rgba8 {
        r: 255,
        g: 255,
        b: 255,
        a: 128,
    }
    .to_premul();
    assert_eq!(p.a, 128);
    assert!(p.r >= 127 && p.r <= 129);
}
