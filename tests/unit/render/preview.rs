use super::*;
use crate::foundation::core::PixelSize;
use crate::scene::layer::TextStyle;
use crate::scene::session::PreparedImage;

fn image(width: u32, height: u32) -> PreparedImage {
    let size = PixelSize::new(width, height).unwrap();
    PreparedImage::from_premul_parts(size, vec![255u8; (width * height * 4) as usize]).unwrap()
}

fn container() -> ContainerSize {
    ContainerSize::new(400.0, 200.0).unwrap()
}

#[test]
fn preview_requires_an_uploaded_image() {
    let session = EditSession::new();
    assert!(render_preview(&session, container()).is_err());
}

#[test]
fn stack_orders_base_texts_cutout() {
    let mut session = EditSession::new();
    let ticket = session.set_original(image(800, 400));
    session.attach_cutout(ticket, image(800, 400));
    session.apply_text("HELLO", TextStyle::default()).unwrap();

    let stack = render_preview(&session, container()).unwrap();
    assert_eq!(stack.base.rect.width(), 400.0);
    assert_eq!(stack.texts.len(), 1);
    let cutout = stack.cutout.expect("cutout tier present");
    assert!(cutout.pointer_transparent);
    assert!(!stack.base.pointer_transparent);
}

#[test]
fn text_anchor_maps_percent_into_container_pixels() {
    let mut session = EditSession::new();
    session.set_original(image(800, 400));
    let id = session.apply_text("HELLO", TextStyle::default()).unwrap();
    session
        .update_position(id, crate::foundation::core::PercentPoint::new(25.0, 75.0))
        .unwrap();

    let stack = render_preview(&session, container()).unwrap();
    assert_eq!(stack.texts[0].anchor, Point::new(100.0, 150.0));
}

#[test]
fn only_the_selected_layer_carries_handles() {
    let mut session = EditSession::new();
    session.set_original(image(800, 400));
    let a = session.apply_text("a", TextStyle::default()).unwrap();
    let b = session.apply_text("b", TextStyle::default()).unwrap();
    session.select(b).unwrap();

    let stack = render_preview(&session, container()).unwrap();
    let tier_a = stack.texts.iter().find(|t| t.layer == a).unwrap();
    let tier_b = stack.texts.iter().find(|t| t.layer == b).unwrap();
    assert!(!tier_a.selected);
    assert!(tier_a.handles.is_empty());
    assert!(tier_b.selected);
    assert_eq!(tier_b.handles.len(), 4);
}

#[test]
fn missing_cutout_means_no_top_tier() {
    let mut session = EditSession::new();
    session.set_original(image(800, 400));
    let stack = render_preview(&session, container()).unwrap();
    assert!(stack.cutout.is_none());
}
