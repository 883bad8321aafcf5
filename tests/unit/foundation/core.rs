use super::*;

#[test]
fn layer_size_validation() {
    assert!(LayerSize::new(0, 10).validate().is_err());
    assert!(LayerSize::new(10, 0).validate().is_err());
    assert!(LayerSize::new(70_000, 10).validate().is_err());
    assert_eq!(
        LayerSize::new(800, 600).validate().unwrap(),
        LayerSize::new(800, 600)
    );
}

#[test]
fn degenerate_pixel_rects_collapse_to_empty() {
    assert_eq!(PixelRect::new(5, 5, 5, 10), PixelRect::EMPTY);
    assert_eq!(PixelRect::new(5, 5, 2, 10), PixelRect::EMPTY);
    assert!(PixelRect::EMPTY.is_empty());
}

#[test]
fn union_with_empty_is_identity() {
    let r = PixelRect::new(1, 2, 3, 4);
    assert_eq!(r.union(PixelRect::EMPTY), r);
    assert_eq!(PixelRect::EMPTY.union(r), r);
    assert_eq!(PixelRect::EMPTY.union(PixelRect::EMPTY), PixelRect::EMPTY);
    assert_eq!(
        r.union(PixelRect::new(10, 0, 20, 10)),
        PixelRect::new(1, 0, 20, 10)
    );
}

#[test]
fn intersect_and_contains() {
    let a = PixelRect::new(0, 0, 10, 10);
    let b = PixelRect::new(5, 5, 15, 15);
    assert_eq!(a.intersect(b), PixelRect::new(5, 5, 10, 10));
    assert_eq!(a.intersect(PixelRect::new(20, 20, 30, 30)), PixelRect::EMPTY);
    assert!(a.contains_rect(PixelRect::new(2, 2, 4, 4)));
    assert!(a.contains_rect(PixelRect::EMPTY));
    assert!(!a.contains_rect(b));
}

#[test]
fn float_rects_round_outward_and_clip() {
    let size = LayerSize::new(100, 50);
    let r = PixelRect::from_rect_clipped(Rect::new(1.2, 2.7, 9.1, 10.0), size);
    assert_eq!(r, PixelRect::new(1, 2, 10, 10));

    let clipped = PixelRect::from_rect_clipped(Rect::new(-5.0, -5.0, 500.0, 500.0), size);
    assert_eq!(clipped, size.full_rect());

    let off = PixelRect::from_rect_clipped(Rect::new(200.0, 0.0, 210.0, 10.0), size);
    assert!(off.is_empty());

    let nan = PixelRect::from_rect_clipped(Rect::new(f64::NAN, 0.0, 1.0, 1.0), size);
    assert!(nan.is_empty());
}

#[test]
fn rgba_premul_roundtrips_opaque_and_handles_transparent() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.a, 128);
    assert_eq!(c.r, 128);
    assert_eq!(c.b, 0);
    let straight = c.to_straight_rgba();
    assert_eq!(straight[0], 255);
    assert_eq!(straight[3], 128);
    assert_eq!(Rgba8Premul::TRANSPARENT.to_straight_rgba(), [0, 0, 0, 0]);
    assert_eq!(
        Rgba8Premul::from_straight_rgba(10, 20, 30, 255).to_array(),
        [10, 20, 30, 255]
    );
}
