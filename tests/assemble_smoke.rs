use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use reelforge::{
    AssemblyConfig, AssemblyOpts, AssemblyRequest, BuiltinFontProvider, Canvas, CaptionChunk,
    Fps, InMemorySink, ReelError, SeededSelector, assemble, assemble_with_sink,
    is_ffmpeg_on_path, is_ffprobe_on_path, probe_audio_duration,
};

fn ffmpeg_tools_available() -> bool {
    is_ffmpeg_on_path() && is_ffprobe_on_path()
}

/// Synthesize a short sine-wave narration track.
fn synth_narration(path: &Path, secs: f64) -> anyhow::Result<()> {
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=440:sample_rate=48000",
            "-t",
            &format!("{secs}"),
            "-c:a",
            "pcm_s16le",
        ])
        .arg(path)
        .status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating narration wav");
    Ok(())
}

fn write_scene_images(dir: &Path, count: usize) -> Vec<std::path::PathBuf> {
    let colors = [[200u8, 40, 40], [40, 200, 40], [40, 40, 200], [200, 200, 40]];
    (0..count)
        .map(|i| {
            let path = dir.join(format!("image_{i}.png"));
            let c = colors[i % colors.len()];
            image::RgbImage::from_pixel(640, 480, image::Rgb(c))
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

/// Small canvas keeps raster and encode costs test-sized.
fn test_cfg() -> AssemblyConfig {
    let mut cfg = AssemblyConfig::default();
    cfg.canvas = Canvas {
        width: 108,
        height: 192,
    };
    cfg.fps = Fps { num: 10, den: 1 };
    cfg
}

fn test_opts() -> AssemblyOpts {
    AssemblyOpts {
        threads: Some(2),
        fonts: Box::new(BuiltinFontProvider),
        music: Box::new(SeededSelector::new(7)),
        ..Default::default()
    }
}

fn captions() -> Vec<CaptionChunk> {
    vec![
        CaptionChunk {
            text: "hello there".into(),
            start: 0.0,
            end: 2.0,
        },
        CaptionChunk {
            text: "second chunk".into(),
            start: 2.0,
            end: 4.0,
        },
        // Filtered out: empty window once clamped.
        CaptionChunk {
            text: "never shown".into(),
            start: 99.0,
            end: 100.0,
        },
    ]
}

#[test]
fn assembles_into_memory_sink_in_frame_order() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("narration.wav");
    synth_narration(&audio, 4.0).unwrap();
    let images = write_scene_images(dir.path(), 3);

    let request = AssemblyRequest {
        audio_path: audio,
        image_paths: images,
        captions: captions(),
        scene_timing: Some(vec![1.0, 2.0, 1.0]),
        music_dir: None,
        output_path: dir.path().join("out.mp4"),
    };

    let mut sink = InMemorySink::new();
    let report = assemble_with_sink(&request, &test_cfg(), &test_opts(), &mut sink).unwrap();

    assert_eq!(report.scenes_total, 3);
    assert_eq!(report.captions_scheduled, 2);
    assert_eq!(report.frames_total, sink.frames().len() as u64);

    // Strictly increasing frame indices, starting at zero.
    for (expect, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, expect as u64);
        assert_eq!((frame.width, frame.height), (108, 192));
    }

    let cfg = sink.config().unwrap();
    assert!(cfg.audio.is_some(), "narration mix must reach the sink");
}

#[test]
fn encodes_final_mp4_matching_audio_duration() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("narration.wav");
    synth_narration(&audio, 3.0).unwrap();
    let images = write_scene_images(dir.path(), 2);

    let music_dir = dir.path().join("music");
    std::fs::create_dir_all(&music_dir).unwrap();
    synth_narration(&music_dir.join("bed.wav"), 1.0).unwrap();

    let out = dir.path().join("final_video.mp4");
    let request = AssemblyRequest {
        audio_path: audio,
        image_paths: images,
        captions: vec![CaptionChunk {
            text: "burned in".into(),
            start: 0.5,
            end: 2.5,
        }],
        scene_timing: None,
        music_dir: Some(music_dir),
        output_path: out.clone(),
    };

    let report = assemble(&request, &test_cfg(), &test_opts()).unwrap();
    assert!(out.exists(), "output mp4 must exist");
    assert!(report.music_track.is_some(), "a music track should be picked");

    // Output duration tracks the narration duration.
    let encoded_secs = probe_audio_duration(&out).unwrap();
    assert!(
        (encoded_secs - report.total_secs).abs() < 0.5,
        "encoded {encoded_secs}s vs narration {}s",
        report.total_secs
    );

    // The audio mix side-file must not be left behind.
    assert!(!out.with_extension("audio.f32le").exists());
}

#[test]
fn cancellation_aborts_without_output() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("narration.wav");
    synth_narration(&audio, 3.0).unwrap();
    let images = write_scene_images(dir.path(), 2);

    let out = dir.path().join("cancelled.mp4");
    let request = AssemblyRequest {
        audio_path: audio,
        image_paths: images,
        captions: Vec::new(),
        scene_timing: None,
        music_dir: None,
        output_path: out.clone(),
    };

    let mut opts = test_opts();
    opts.cancel = Some(Arc::new(AtomicBool::new(true)));

    let err = assemble(&request, &test_cfg(), &opts).unwrap_err();
    assert!(matches!(err, ReelError::Cancelled));
    assert!(!out.exists(), "cancelled assembly must leave no output file");
}

#[test]
fn unreadable_image_degrades_not_fatal() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("narration.wav");
    synth_narration(&audio, 3.0).unwrap();
    let mut images = write_scene_images(dir.path(), 2);

    // Second scene's file is corrupt; the run must still succeed with the
    // surviving scene.
    std::fs::write(&images[1], b"not a png").unwrap();
    images.truncate(2);

    let request = AssemblyRequest {
        audio_path: audio,
        image_paths: images,
        captions: Vec::new(),
        scene_timing: None,
        music_dir: None,
        output_path: dir.path().join("degraded.mp4"),
    };

    let mut sink = InMemorySink::new();
    let report = assemble_with_sink(&request, &test_cfg(), &test_opts(), &mut sink).unwrap();
    assert_eq!(report.scenes_total, 2);
    assert!(!sink.frames().is_empty());
}
