use super::*;
use crate::config::AssemblyConfig;

fn cfg() -> AssemblyConfig {
    AssemblyConfig::default()
}

#[test]
fn weighted_durations_sum_to_audio_duration() {
    let cfg = cfg();
    let weights = [3.0, 7.0, 8.0, 10.0, 10.0, 8.0, 7.0, 7.0];
    let durations = allocate_durations(8, 62.5, Some(&weights), &cfg);
    let sum: f64 = durations.iter().sum();
    assert!((sum - 62.5).abs() < 1e-3, "sum {sum}");
}

#[test]
fn min_floor_then_rescale_matches_worked_example() {
    // weights [3,7,8,10] over 30s with a 4s floor: raw pre-scale durations
    // are [4.0, 7.5, 8.571, 10.714] (sum 30.785), rescaled by 30/30.785.
    let cfg = cfg();
    let durations = allocate_durations(4, 30.0, Some(&[3.0, 7.0, 8.0, 10.0]), &cfg);
    let expected = [3.898, 7.309, 8.354, 10.439];
    for (d, e) in durations.iter().zip(expected) {
        assert!((d - e).abs() < 0.01, "got {d}, expected {e}");
    }
    let sum: f64 = durations.iter().sum();
    assert!((sum - 30.0).abs() < 0.01);
}

#[test]
fn equal_fallback_clamps_without_rescaling() {
    let cfg = cfg();

    // 10s over 4 images: base 2.5s clamps up to the 4s floor and the total
    // deliberately drifts past the audio duration.
    let durations = allocate_durations(4, 10.0, None, &cfg);
    assert_eq!(durations, vec![4.0; 4]);

    // 60s over 2 images clamps down to the 14s ceiling.
    let durations = allocate_durations(2, 60.0, None, &cfg);
    assert_eq!(durations, vec![14.0; 2]);

    // Unclamped case: exact equal split.
    let durations = allocate_durations(4, 32.0, None, &cfg);
    assert_eq!(durations, vec![8.0; 4]);
}

#[test]
fn invalid_weights_fall_back_to_equal_distribution() {
    let cfg = cfg();
    let equal = allocate_durations(3, 24.0, None, &cfg);

    // Wrong length.
    assert_eq!(
        allocate_durations(3, 24.0, Some(&[1.0, 2.0]), &cfg),
        equal
    );
    // Non-positive entry.
    assert_eq!(
        allocate_durations(3, 24.0, Some(&[1.0, 0.0, 2.0]), &cfg),
        equal
    );
    assert_eq!(
        allocate_durations(3, 24.0, Some(&[1.0, -2.0, 2.0]), &cfg),
        equal
    );
}

#[test]
fn start_offsets_accumulate_display_durations() {
    let cfg = cfg();
    let timeline = build_timeline(3, 30.0, None, &cfg).unwrap();
    assert_eq!(timeline.slots.len(), 3);
    assert_eq!(timeline.slots[0].start_secs, 0.0);
    assert!((timeline.slots[1].start_secs - 10.0).abs() < 1e-9);
    assert!((timeline.slots[2].start_secs - 20.0).abs() < 1e-9);

    // Interior clips carry the crossfade tail; their spans overlap the next
    // clip's head.
    assert!((timeline.slots[0].clip_secs - (10.0 + cfg.crossfade_secs)).abs() < 1e-9);
    let s1_end = timeline.slots[1].start_secs + timeline.slots[1].clip_secs;
    assert!(s1_end > timeline.slots[2].start_secs);
}

#[test]
fn final_clip_never_extends_past_total() {
    let cfg = cfg();
    let timeline = build_timeline(3, 30.0, None, &cfg).unwrap();
    let last = timeline.slots.last().unwrap();
    assert!(last.start_secs + last.clip_secs <= timeline.total_secs + 1e-9);
}

#[test]
fn camera_profiles_cycle_every_eight_scenes() {
    let cfg = cfg();
    let timeline = build_timeline(10, 120.0, None, &cfg).unwrap();
    assert_eq!(timeline.slots[0].camera, CameraPath::from_index(0));
    assert_eq!(timeline.slots[8].camera, CameraPath::from_index(0));
    assert_eq!(timeline.slots[9].camera, CameraPath::from_index(1));
}

#[test]
fn fade_flags_skip_first_and_last() {
    let cfg = cfg();
    let timeline = build_timeline(3, 30.0, None, &cfg).unwrap();
    assert!(!timeline.slots[0].fades_in());
    assert!(timeline.slots[1].fades_in());
    assert!(timeline.fades_out(0));
    assert!(timeline.fades_out(1));
    assert!(!timeline.fades_out(2));
}

#[test]
fn empty_inputs_are_fatal() {
    let cfg = cfg();
    assert!(build_timeline(0, 30.0, None, &cfg).is_err());
    assert!(build_timeline(3, 0.0, None, &cfg).is_err());
    assert!(build_timeline(3, f64::NAN, None, &cfg).is_err());
}
