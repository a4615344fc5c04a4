use super::*;
use crate::config::AssemblyConfig;
use crate::scene::prepare::{PreparedCanvas, working_canvas_size};

fn cfg() -> AssemblyConfig {
    AssemblyConfig::default()
}

fn canvas_for(cfg: &AssemblyConfig) -> Arc<PreparedCanvas> {
    let (w, h) = working_canvas_size(cfg);
    Arc::new(PreparedCanvas {
        rgb: image::RgbImage::from_pixel(w, h, image::Rgb([40, 80, 120])),
    })
}

#[test]
fn profile_selection_is_modular_and_stable() {
    assert_eq!(CameraPath::from_index(0), CameraPath::ZoomInRightDown);
    assert_eq!(CameraPath::from_index(7), CameraPath::ZoomOutDiagonal);
    assert_eq!(CameraPath::from_index(8), CameraPath::ZoomInRightDown);
    assert_eq!(CameraPath::from_index(13), CameraPath::ZoomOutDown);
}

#[test]
fn all_profiles_are_distinct() {
    let cfg = cfg();
    let mut seen = Vec::new();
    for i in 0..CameraPath::COUNT {
        let p = CameraPath::from_index(i).profile(&cfg);
        let key = (
            p.start_zoom.to_bits(),
            p.end_zoom.to_bits(),
            p.start_pan_x,
            p.end_pan_x,
            p.start_pan_y,
            p.end_pan_y,
        );
        assert!(!seen.contains(&key), "profile {i} duplicates another");
        seen.push(key);
    }
}

#[test]
fn crop_width_matches_zoom_at_endpoints() {
    let cfg = cfg();
    let (cw, ch) = working_canvas_size(&cfg);
    let profile = CameraPath::ZoomInRightDown.profile(&cfg);

    // t = 0: zoom 1.0, crop exactly the output size.
    let win = crop_window_at(&profile, 0.0, cw, ch, 1080, 1920).unwrap();
    assert_eq!(win.width(), 1080);
    assert_eq!(win.height(), 1920);

    // t = duration: zoom 1.2, crop floor(out / zoom).
    let win = crop_window_at(&profile, 1.0, cw, ch, 1080, 1920).unwrap();
    assert_eq!(win.width(), (1080.0 / 1.2) as u32);
    assert_eq!(win.height(), (1920.0 / 1.2) as u32);
}

#[test]
fn crop_window_stays_in_bounds_for_all_profiles() {
    let cfg = cfg();
    let (cw, ch) = working_canvas_size(&cfg);
    for i in 0..CameraPath::COUNT {
        let profile = CameraPath::from_index(i).profile(&cfg);
        for step in 0..=100 {
            let p = f64::from(step) / 100.0;
            let win = crop_window_at(&profile, p, cw, ch, 1080, 1920).unwrap();
            assert!(win.x1 < win.x2, "profile {i} at {p}");
            assert!(win.y1 < win.y2, "profile {i} at {p}");
            assert!(win.x2 <= cw, "profile {i} at {p}: x2 {} > {cw}", win.x2);
            assert!(win.y2 <= ch, "profile {i} at {p}: y2 {} > {ch}", win.y2);
        }
    }
}

#[test]
fn boundary_overrun_shifts_rather_than_shrinks() {
    // Pan pushed far right at zoom 1.0 would overrun the right edge; the
    // window must shift back while keeping its exact size.
    let profile = CameraProfile {
        start_zoom: 1.0,
        end_zoom: 1.0,
        start_pan_x: 10_000,
        end_pan_x: 10_000,
        start_pan_y: 0,
        end_pan_y: 0,
    };
    let win = crop_window_at(&profile, 0.5, 1416, 2384, 1080, 1920).unwrap();
    assert_eq!(win.width(), 1080);
    assert_eq!(win.height(), 1920);
    assert_eq!(win.x2, 1416);
}

#[test]
fn progress_is_clamped_outside_unit_interval() {
    let cfg = cfg();
    let (cw, ch) = working_canvas_size(&cfg);
    let profile = CameraPath::ZoomInRightDown.profile(&cfg);
    let before = crop_window_at(&profile, -0.5, cw, ch, 1080, 1920).unwrap();
    let at_zero = crop_window_at(&profile, 0.0, cw, ch, 1080, 1920).unwrap();
    assert_eq!(before, at_zero);
    let after = crop_window_at(&profile, 1.7, cw, ch, 1080, 1920).unwrap();
    let at_one = crop_window_at(&profile, 1.0, cw, ch, 1080, 1920).unwrap();
    assert_eq!(after, at_one);
}

#[test]
fn render_frame_has_output_dimensions() {
    let cfg = cfg();
    let animator = KenBurnsAnimator::new(canvas_for(&cfg), CameraPath::from_index(2), &cfg, 5.0);
    let frame = animator.render_frame(2.5).unwrap();
    assert_eq!((frame.width, frame.height), (1080, 1920));
    assert_eq!(frame.data.len(), 1080 * 1920 * 4);
    assert!(frame.premultiplied);
}

#[test]
fn render_frame_rejects_bad_time() {
    let cfg = cfg();
    let animator = KenBurnsAnimator::new(canvas_for(&cfg), CameraPath::from_index(0), &cfg, 5.0);
    assert!(animator.render_frame(f64::NAN).is_err());
}

#[test]
fn static_fallback_always_produces_a_frame() {
    let cfg = cfg();
    let animator = KenBurnsAnimator::new(canvas_for(&cfg), CameraPath::from_index(0), &cfg, 5.0);
    let frame = animator.static_frame();
    assert_eq!((frame.width, frame.height), (1080, 1920));
    let via_combinator = animator.render_or_static(f64::NAN);
    assert_eq!(via_combinator.data, frame.data);
}
