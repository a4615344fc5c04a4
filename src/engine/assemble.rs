use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::assets::fonts::{FontProvider, SystemFontProvider};
use crate::assets::media::{MIX_SAMPLE_RATE, decode_audio_f32_stereo, probe_audio_duration};
use crate::audio::mix::{build_soundtrack, write_mix_to_f32le_file};
use crate::audio::music::{MusicSelector, SeededSelector, scan_music_dir};
use crate::captions::render::{CaptionChunk, CaptionCompositor, ScheduledCaption};
use crate::config::AssemblyConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::engine::frame::{SceneLayer, SceneSource, compose_frame};
use crate::foundation::core::{FrameIndex, FrameRGBA};
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::ken_burns::{KenBurnsAnimator, rgb_to_opaque_frame};
use crate::scene::prepare;
use crate::scene::timeline::{CompositionTimeline, build_timeline};

/// Everything an assembly run consumes.
///
/// The collaborators that produce these inputs (narration synthesis, image
/// generation, caption chunking) live outside this crate.
#[derive(Clone, Debug)]
pub struct AssemblyRequest {
    /// Narration audio; its duration fixes the total video duration.
    pub audio_path: PathBuf,
    /// Ordered still images, one per scene.
    pub image_paths: Vec<PathBuf>,
    /// Time-stamped caption chunks, monotonically non-decreasing in start.
    pub captions: Vec<CaptionChunk>,
    /// Optional relative scene weights, same length as `image_paths`.
    pub scene_timing: Option<Vec<f64>>,
    /// Optional directory of background music tracks.
    pub music_dir: Option<PathBuf>,
    /// Output MP4 path.
    pub output_path: PathBuf,
}

/// Tunables that do not affect output content.
pub struct AssemblyOpts {
    /// Override rayon worker thread count; `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames rendered per parallel batch (also bounds encoder backlog).
    pub chunk_size: usize,
    /// Cooperative cancellation flag, checked between frame batches.
    pub cancel: Option<Arc<AtomicBool>>,
    /// Caption font resolution strategy.
    pub fonts: Box<dyn FontProvider>,
    /// Background music selection strategy.
    pub music: Box<dyn MusicSelector>,
}

impl Default for AssemblyOpts {
    fn default() -> Self {
        Self {
            threads: None,
            chunk_size: 16,
            cancel: None,
            fonts: Box::new(SystemFontProvider::default_bold()),
            music: Box::new(SeededSelector::default()),
        }
    }
}

/// Summary of a completed assembly.
#[derive(Clone, Debug)]
pub struct AssemblyReport {
    /// Total composition duration in seconds (== narration duration).
    pub total_secs: f64,
    /// Frames encoded.
    pub frames_total: u64,
    /// Scenes in the timeline.
    pub scenes_total: usize,
    /// Scenes that degraded to the static fallback.
    pub scenes_fallback: usize,
    /// Caption overlays scheduled after filtering.
    pub captions_scheduled: usize,
    /// Chosen background music track, if any.
    pub music_track: Option<PathBuf>,
}

/// Assemble the final video to `request.output_path` through ffmpeg.
pub fn assemble(
    request: &AssemblyRequest,
    cfg: &AssemblyConfig,
    opts: &AssemblyOpts,
) -> ReelResult<AssemblyReport> {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&request.output_path));
    let report = assemble_with_sink(request, cfg, opts, &mut sink)?;
    info!(
        out = %request.output_path.display(),
        secs = report.total_secs,
        frames = report.frames_total,
        "assembly complete"
    );
    Ok(report)
}

/// Assemble into an arbitrary frame sink.
///
/// Per-scene failures degrade to static crops; the run aborts only when the
/// audio is unreadable, no scene at all could be prepared, the sink fails,
/// or cancellation is requested.
pub fn assemble_with_sink(
    request: &AssemblyRequest,
    cfg: &AssemblyConfig,
    opts: &AssemblyOpts,
    sink: &mut dyn FrameSink,
) -> ReelResult<AssemblyReport> {
    cfg.validate()?;
    if request.image_paths.is_empty() {
        return Err(ReelError::input("no images provided for assembly"));
    }

    let total_secs = probe_audio_duration(&request.audio_path)?;
    info!(
        images = request.image_paths.len(),
        captions = request.captions.len(),
        secs = total_secs,
        "assembling {}x{} @ {}fps video",
        cfg.canvas.width,
        cfg.canvas.height,
        cfg.fps.as_f64(),
    );

    let timeline = build_timeline(
        request.image_paths.len(),
        total_secs,
        request.scene_timing.as_deref(),
        cfg,
    )?;

    let (layers, scenes_fallback) = prepare_layers(&timeline, request, cfg)?;
    let captions = schedule_captions(request, cfg, opts.fonts.as_ref(), total_secs)?;

    let (audio_cfg, _mix_guard, music_track) = prepare_audio(request, cfg, opts, total_secs)?;

    let frames_total = cfg.fps.secs_to_frames_round(total_secs).max(1);
    render_and_encode(
        &layers,
        &captions,
        cfg,
        opts,
        sink,
        frames_total,
        audio_cfg,
    )?;

    Ok(AssemblyReport {
        total_secs,
        frames_total,
        scenes_total: timeline.slots.len(),
        scenes_fallback,
        captions_scheduled: captions.len(),
        music_track,
    })
}

/// Build scene layers, degrading per scene and skipping scenes whose image
/// cannot be used at all. Aborts only when nothing survived.
fn prepare_layers(
    timeline: &CompositionTimeline,
    request: &AssemblyRequest,
    cfg: &AssemblyConfig,
) -> ReelResult<(Vec<SceneLayer>, usize)> {
    let last = timeline.slots.len().saturating_sub(1);
    let mut layers = Vec::with_capacity(timeline.slots.len());
    let mut fallbacks = 0usize;

    for slot in &timeline.slots {
        let path = &request.image_paths[slot.image_index];
        let source = match prepare::prepare(path, cfg) {
            Ok(canvas) => SceneSource::Animated(KenBurnsAnimator::new(
                Arc::new(canvas),
                slot.camera,
                cfg,
                slot.clip_secs,
            )),
            Err(e) => {
                warn!(
                    scene = slot.image_index,
                    "ken burns prepare failed ({e}), trying static crop"
                );
                match prepare::prepare_static(path, cfg) {
                    Ok(rgb) => {
                        fallbacks += 1;
                        SceneSource::Static(Arc::new(rgb_to_opaque_frame(&rgb)))
                    }
                    Err(e2) => {
                        warn!(scene = slot.image_index, "static fallback also failed ({e2}), skipping scene");
                        continue;
                    }
                }
            }
        };
        layers.push(SceneLayer {
            slot: slot.clone(),
            source,
            fades_in: slot.image_index > 0,
            fades_out: slot.image_index < last,
        });
    }

    if layers.is_empty() {
        return Err(ReelError::render("no scene could be rendered"));
    }
    Ok((layers, fallbacks))
}

fn schedule_captions(
    request: &AssemblyRequest,
    cfg: &AssemblyConfig,
    fonts: &dyn FontProvider,
    total_secs: f64,
) -> ReelResult<Vec<ScheduledCaption>> {
    if request.captions.is_empty() {
        return Ok(Vec::new());
    }
    let mut compositor = CaptionCompositor::new(cfg, fonts);
    let scheduled = compositor.schedule(&request.captions, total_secs);
    if scheduled.is_empty() {
        // The caller supplied chunks and every one of them filtered out;
        // that points at broken timestamps upstream rather than an
        // intentionally caption-free video.
        return Err(ReelError::input(
            "every caption chunk was empty after filtering",
        ));
    }
    Ok(scheduled)
}

fn prepare_audio(
    request: &AssemblyRequest,
    cfg: &AssemblyConfig,
    opts: &AssemblyOpts,
    total_secs: f64,
) -> ReelResult<(AudioInputConfig, TempFileGuard, Option<PathBuf>)> {
    let narration = decode_audio_f32_stereo(&request.audio_path, MIX_SAMPLE_RATE)?;
    if narration.frames() == 0 {
        return Err(ReelError::input(format!(
            "narration '{}' decoded to zero samples",
            request.audio_path.display()
        )));
    }

    let mut music_track = None;
    let mut music_pcm = None;
    if let Some(dir) = request.music_dir.as_ref() {
        let tracks = scan_music_dir(dir)?;
        if let Some(pick) = opts.music.select(&tracks) {
            match decode_audio_f32_stereo(pick, MIX_SAMPLE_RATE) {
                Ok(pcm) if !pcm.interleaved_f32.is_empty() => {
                    info!(track = %pick.display(), "mixing background music");
                    music_track = Some(pick.clone());
                    music_pcm = Some(pcm);
                }
                Ok(_) => warn!(track = %pick.display(), "music track decoded empty, skipping"),
                Err(e) => warn!(track = %pick.display(), "failed to decode music ({e}), skipping"),
            }
        }
    }

    let samples = build_soundtrack(&narration, music_pcm.as_ref(), total_secs, &cfg.music);
    let mix_path = request.output_path.with_extension("audio.f32le");
    write_mix_to_f32le_file(&samples, &mix_path)?;

    Ok((
        AudioInputConfig {
            path: mix_path.clone(),
            sample_rate: MIX_SAMPLE_RATE,
            channels: 2,
        },
        TempFileGuard(Some(mix_path)),
        music_track,
    ))
}

/// Chunked parallel rendering feeding a single encoder thread.
///
/// Frames inside a chunk render concurrently, then stream to the sink in
/// strictly increasing index order. The cancellation flag is checked between
/// chunks; on cancellation or a producer error the sink's `end` is never
/// called, so file sinks discard their partial output.
fn render_and_encode(
    layers: &[SceneLayer],
    captions: &[ScheduledCaption],
    cfg: &AssemblyConfig,
    opts: &AssemblyOpts,
    sink: &mut dyn FrameSink,
    frames_total: u64,
    audio: AudioInputConfig,
) -> ReelResult<()> {
    let pool = build_thread_pool(opts.threads)?;
    let chunk = opts.chunk_size.max(1) as u64;
    let (tx, rx) = mpsc::sync_channel::<(FrameIndex, FrameRGBA)>(opts.chunk_size.max(1));
    let completed = AtomicBool::new(false);

    let sink_cfg = SinkConfig {
        width: cfg.canvas.width,
        height: cfg.canvas.height,
        fps: cfg.fps,
        audio: Some(audio),
    };

    std::thread::scope(|s| -> ReelResult<()> {
        let completed = &completed;
        let encoder = s.spawn(move || -> ReelResult<()> {
            sink.begin(sink_cfg)?;
            while let Ok((idx, frame)) = rx.recv() {
                sink.push_frame(idx, &frame)?;
            }
            if completed.load(Ordering::Acquire) {
                sink.end()?;
            }
            Ok(())
        });

        let produced = (|| -> ReelResult<()> {
            let mut start = 0u64;
            while start < frames_total {
                if let Some(cancel) = opts.cancel.as_ref()
                    && cancel.load(Ordering::Relaxed)
                {
                    return Err(ReelError::Cancelled);
                }
                let end = (start + chunk).min(frames_total);

                let rendered: Vec<ReelResult<(u64, FrameRGBA)>> = pool.install(|| {
                    (start..end)
                        .into_par_iter()
                        .map(|i| {
                            let t = cfg.fps.frames_to_secs(i);
                            compose_frame(t, layers, captions, cfg).map(|f| (i, f))
                        })
                        .collect()
                });
                for r in rendered {
                    let (i, frame) = r?;
                    tx.send((FrameIndex(i), frame)).map_err(|_| {
                        ReelError::encode("encoder thread is not accepting frames")
                    })?;
                }
                start = end;
            }
            completed.store(true, Ordering::Release);
            Ok(())
        })();

        drop(tx);
        let encoded = encoder
            .join()
            .map_err(|_| ReelError::encode("encoder thread panicked"))?;
        // A sink failure is the root cause when both sides errored (the
        // producer only sees the closed channel).
        encoded?;
        produced
    })
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::config("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_list_is_fatal_input() {
        let request = AssemblyRequest {
            audio_path: PathBuf::from("/nonexistent/narration.mp3"),
            image_paths: Vec::new(),
            captions: Vec::new(),
            scene_timing: None,
            music_dir: None,
            output_path: PathBuf::from("/tmp/out.mp4"),
        };
        let err = assemble_with_sink(
            &request,
            &AssemblyConfig::default(),
            &AssemblyOpts::default(),
            &mut crate::encode::sink::InMemorySink::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ReelError::Input(_)));
    }

    #[test]
    fn zero_threads_is_config_error() {
        let err = build_thread_pool(Some(0)).unwrap_err();
        assert!(matches!(err, ReelError::Config(_)));
    }

    #[test]
    fn temp_file_guard_removes_file() {
        let dir = std::env::temp_dir().join("reelforge-guard-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mix.f32le");
        std::fs::write(&path, b"x").unwrap();
        drop(TempFileGuard(Some(path.clone())));
        assert!(!path.exists());
    }
}
