use super::*;
use crate::foundation::core::{LayerSize, Rect};
use crate::geometry::primitive::Dab;

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Primitive {
    Primitive::Fill {
        path: Rect::new(x0, y0, x1, y1).to_path(0.1),
    }
}

fn layer() -> Layer {
    Layer::new(LayerSize::new(32, 32)).unwrap()
}

#[test]
fn fill_covers_interior_and_reports_bounds() {
    let mut r = Rasterizer::new();
    let mut target = layer();
    let bounds = r
        .draw(
            &[square(4.0, 4.0, 12.0, 12.0)],
            Rgba8Premul::BLACK,
            LayerBlend::SourceOver,
            &mut target,
        )
        .unwrap();
    assert_eq!(bounds, PixelRect::new(3, 3, 13, 13));
    assert_eq!(target.pixel(8, 8), Some([0, 0, 0, 255]));
    assert_eq!(target.pixel(20, 20), Some([0, 0, 0, 0]));
}

#[test]
fn empty_input_draws_nothing() {
    let mut r = Rasterizer::new();
    let mut target = layer();
    let bounds = r
        .draw(&[], Rgba8Premul::BLACK, LayerBlend::SourceOver, &mut target)
        .unwrap();
    assert!(bounds.is_empty());
    assert!(target.data().iter().all(|&b| b == 0));
}

#[test]
fn overlapping_fills_keep_stroke_alpha_under_max() {
    let mut r = Rasterizer::new();
    let mut target = layer();
    let color = Rgba8Premul::from_straight_rgba(0, 0, 0, 128);
    let prims = [square(4.0, 4.0, 12.0, 12.0), square(6.0, 6.0, 14.0, 14.0)];
    r.draw(&prims, color, LayerBlend::Max, &mut target).unwrap();
    r.draw(&prims, color, LayerBlend::Max, &mut target).unwrap();
    assert_eq!(target.pixel(8, 8).map(|p| p[3]), Some(128));
}

#[test]
fn dabs_are_translucent() {
    let mut r = Rasterizer::new();
    let mut target = layer();
    let dab = Primitive::Dab(Dab {
        center: Point::new(16.0, 16.0),
        radius: 6.0,
        alpha: 0.5,
    });
    r.draw(&[dab], Rgba8Premul::BLACK, LayerBlend::SourceOver, &mut target)
        .unwrap();
    let a = target.pixel(16, 16).unwrap()[3];
    assert!((120..=136).contains(&a), "alpha {a}");
}

#[test]
fn scratch_follows_target_size() {
    let mut r = Rasterizer::new();
    let mut small = layer();
    let mut big = Layer::new(LayerSize::new(64, 48)).unwrap();
    r.draw(
        &[square(1.0, 1.0, 5.0, 5.0)],
        Rgba8Premul::BLACK,
        LayerBlend::SourceOver,
        &mut small,
    )
    .unwrap();
    r.draw(
        &[square(40.0, 40.0, 44.0, 44.0)],
        Rgba8Premul::BLACK,
        LayerBlend::SourceOver,
        &mut big,
    )
    .unwrap();
    assert_eq!(big.pixel(42, 42), Some([0, 0, 0, 255]));
    assert_eq!(big.pixel(3, 3), Some([0, 0, 0, 0]));
}

#[test]
fn dabs_carry_stroke_alpha() {
    let mut r = Rasterizer::new();
    let mut target = layer();
    let dab = Primitive::Dab(Dab {
        center: Point::new(16.0, 16.0),
        radius: 6.0,
        alpha: 1.0,
    });
    let color = Rgba8Premul::from_straight_rgba(0, 0, 0, 128);
    r.draw(&[dab], color, LayerBlend::SourceOver, &mut target)
        .unwrap();
    let a = target.pixel(16, 16).unwrap()[3];
    assert!((124..=132).contains(&a), "alpha {a}");
}

#[test]
fn earlier_draws_do_not_leak_into_later_targets() {
    let mut r = Rasterizer::new();
    let mut first = layer();
    let mut second = layer();
    r.draw(
        &[square(2.0, 2.0, 10.0, 10.0)],
        Rgba8Premul::BLACK,
        LayerBlend::SourceOver,
        &mut first,
    )
    .unwrap();
    let bounds = r
        .draw(
            &[square(4.0, 4.0, 20.0, 20.0)],
            Rgba8Premul::from_straight_rgba(0, 0, 0, 0),
            LayerBlend::SourceOver,
            &mut second,
        )
        .unwrap();
    assert!(bounds.contains_rect(PixelRect::new(4, 4, 10, 10)));
    assert!(second.data().iter().all(|&b| b == 0));

    r.draw(
        &[square(12.0, 12.0, 20.0, 20.0)],
        Rgba8Premul::BLACK,
        LayerBlend::SourceOver,
        &mut second,
    )
    .unwrap();
    assert_eq!(second.pixel(6, 6), Some([0, 0, 0, 0]));
    assert_eq!(second.pixel(16, 16), Some([0, 0, 0, 255]));
}
