use super::*;

#[test]
fn standard_layout_matches_card_geometry() {
    let l = CardLayout::STANDARD;
    assert_eq!((l.avatar.x0, l.avatar.y0), (20.0, 120.0));
    assert_eq!((l.avatar.width(), l.avatar.height()), (80.0, 80.0));
    assert_eq!((l.bubble.x0, l.bubble.y0), (120.0, 100.0));
    assert_eq!((l.bubble.width(), l.bubble.height()), (360.0, 250.0));
    assert_eq!(l.body_max_width_px, 320.0);
}

#[test]
fn body_baselines_step_by_line_height() {
    let l = CardLayout::default();
    assert_eq!(l.body_baseline(0), Point::new(140.0, 200.0));
    assert_eq!(l.body_baseline(3), Point::new(140.0, 335.0));
}

#[test]
fn opaque_sets_full_alpha() {
    assert_eq!(
        Rgba8::opaque(1, 2, 3),
        Rgba8 {
            r: 1,
            g: 2,
            b: 3,
            a: 255
        }
    );
}
