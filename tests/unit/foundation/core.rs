use super::*;

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert_eq!(r.len_frames(), 3);
    assert!(!r.is_empty());
}

#[test]
fn frame_range_contains_is_half_open() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
}

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_round_trips_frames_and_seconds() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.as_f64(), 30.0);
    assert_eq!(fps.secs_to_frames_round(1.0), 30);
    assert_eq!(fps.secs_to_frames_round(31.0 / 30.0), 31);
    assert!((fps.frames_to_secs(30) - 1.0).abs() < 1e-12);
}

#[test]
fn transparent_frame_is_zeroed() {
    let f = FrameRGBA::transparent(4, 2);
    assert_eq!(f.data.len(), 4 * 2 * 4);
    assert!(f.data.iter().all(|&b| b == 0));
    assert!(f.premultiplied);
}
