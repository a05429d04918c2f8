use super::*;
use crate::foundation::core::PixelSize;

fn session_with_placement() -> EditSession {
    let mut session = EditSession::new();
    let size = PixelSize::new(4, 4).unwrap();
    let img = crate::scene::session::PreparedImage::from_premul_parts(size, vec![255u8; 64]).unwrap();
    let ticket = session.set_original(img.clone());
    session.attach_cutout(ticket, img.clone());
    session.set_background(img);
    session.set_cutout_placement(PlacementRect {
        x: 50.0,
        y: 40.0,
        width: 200.0,
        height: 100.0,
    });
    session
}

#[test]
fn initial_placement_caps_largest_dimension() {
    let wide = PlacementRect::initial_for(PixelSize::new(400, 100).unwrap());
    assert_eq!(wide.width, 200.0);
    assert_eq!(wide.height, 50.0);

    let tall = PlacementRect::initial_for(PixelSize::new(100, 400).unwrap());
    assert_eq!(tall.height, 200.0);
    assert_eq!(tall.width, 50.0);
}

#[test]
fn drag_keeps_the_grab_point_under_the_pointer() {
    let mut session = session_with_placement();
    let mut ctl = PlacementController::new(PlacementConfig::default());

    // Grab 10px inside the rect.
    ctl.pointer_start(&mut session, PlacementTarget::Body, PointerPoint::new(60.0, 50.0));
    ctl.pointer_move(&mut session, PointerPoint::new(100.0, 90.0));
    ctl.pointer_end();

    let rect = session.cutout_placement().unwrap();
    assert_eq!(rect.x, 90.0);
    assert_eq!(rect.y, 80.0);
    assert!(ctl.is_selected());
}

#[test]
fn right_handle_resize_preserves_aspect_ratio() {
    let mut session = session_with_placement();
    let mut ctl = PlacementController::new(PlacementConfig::default());

    ctl.pointer_start(
        &mut session,
        PlacementTarget::Handle(ResizeHandle::BottomRight),
        PointerPoint::new(250.0, 140.0),
    );
    ctl.pointer_move(&mut session, PointerPoint::new(290.0, 140.0));
    ctl.pointer_end();

    let rect = session.cutout_placement().unwrap();
    assert_eq!(rect.width, 240.0);
    assert_eq!(rect.height, 120.0);
    // Origin untouched for right/bottom handles.
    assert_eq!((rect.x, rect.y), (50.0, 40.0));
}

#[test]
fn left_handle_resize_keeps_opposite_corner_fixed() {
    let mut session = session_with_placement();
    let mut ctl = PlacementController::new(PlacementConfig::default());

    ctl.pointer_start(
        &mut session,
        PlacementTarget::Handle(ResizeHandle::TopLeft),
        PointerPoint::new(50.0, 40.0),
    );
    ctl.pointer_move(&mut session, PointerPoint::new(10.0, 40.0));
    ctl.pointer_end();

    let rect = session.cutout_placement().unwrap();
    assert_eq!(rect.width, 240.0);
    assert_eq!(rect.height, 120.0);
    // The bottom-right corner stays where it was: (250, 140).
    assert_eq!(rect.x + rect.width, 250.0);
    assert_eq!(rect.y + rect.height, 140.0);
}

#[test]
fn resize_honors_minimum_width() {
    let mut session = session_with_placement();
    let mut ctl = PlacementController::new(PlacementConfig::default());

    ctl.pointer_start(
        &mut session,
        PlacementTarget::Handle(ResizeHandle::BottomRight),
        PointerPoint::new(250.0, 140.0),
    );
    ctl.pointer_move(&mut session, PointerPoint::new(-10_000.0, 140.0));

    let rect = session.cutout_placement().unwrap();
    assert_eq!(rect.width, PlacementConfig::default().min_width_px);
}

#[test]
fn background_press_deselects() {
    let mut session = session_with_placement();
    let mut ctl = PlacementController::new(PlacementConfig::default());

    ctl.pointer_start(&mut session, PlacementTarget::Body, PointerPoint::new(60.0, 50.0));
    ctl.pointer_end();
    assert!(ctl.is_selected());

    ctl.pointer_start(&mut session, PlacementTarget::Background, PointerPoint::new(0.0, 0.0));
    assert!(!ctl.is_selected());
}
