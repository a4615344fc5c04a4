use crate::config::AssemblyConfig;
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::ken_burns::CameraPath;

/// One image's scheduled appearance in the timeline.
#[derive(Clone, Debug)]
pub struct SceneSlot {
    /// Index into the assembly's ordered image list.
    pub image_index: usize,
    /// Seconds this scene owns exclusively (crossfade overlap excluded).
    pub display_secs: f64,
    /// Seconds the clip actually plays, including the crossfade tail.
    pub clip_secs: f64,
    /// Timeline offset where the clip starts.
    pub start_secs: f64,
    /// Camera motion profile for this scene.
    pub camera: CameraPath,
}

impl SceneSlot {
    /// Whether this scene fades in over the first crossfade interval.
    pub fn fades_in(&self) -> bool {
        self.image_index > 0
    }
}

/// Ordered scene slots plus the fixed total duration.
///
/// `total_secs` comes from the narration track; every slot duration is
/// derived to fit inside it.
#[derive(Clone, Debug)]
pub struct CompositionTimeline {
    /// Scene slots in playback order.
    pub slots: Vec<SceneSlot>,
    /// Total composition duration in seconds (== audio duration).
    pub total_secs: f64,
}

impl CompositionTimeline {
    /// Whether the slot at `index` fades out over its final crossfade
    /// interval (every scene but the last).
    pub fn fades_out(&self, index: usize) -> bool {
        index + 1 < self.slots.len()
    }
}

/// Allocate per-scene display durations.
///
/// With valid `weights` (matching length, all strictly positive) each scene
/// gets `max(min_scene_secs, w_i/Σw · audio)`, then everything is rescaled so
/// the sum is exactly `audio_duration`. The floor can distort the requested
/// proportions when it triggers; that is accepted, not corrected.
///
/// Without valid weights every scene gets `clamp(audio/n, min, max)`. This
/// fallback deliberately does not rescale, so the sum may drift from the
/// audio duration when clamping triggers — the composition is still cut at
/// the audio duration downstream.
pub fn allocate_durations(
    num_images: usize,
    audio_duration: f64,
    weights: Option<&[f64]>,
    cfg: &AssemblyConfig,
) -> Vec<f64> {
    if num_images == 0 {
        return Vec::new();
    }

    match weights {
        Some(w) => match validate_weights(w, num_images) {
            Ok(()) => {
                let total_weight: f64 = w.iter().sum();
                let mut durations: Vec<f64> = w
                    .iter()
                    .map(|&wi| (wi / total_weight * audio_duration).max(cfg.min_scene_secs))
                    .collect();
                let raw_sum: f64 = durations.iter().sum();
                let scale = audio_duration / raw_sum;
                for d in &mut durations {
                    *d *= scale;
                }
                durations
            }
            Err(e) => {
                tracing::warn!("scene timing rejected ({e}), using equal distribution");
                equal_distribution(num_images, audio_duration, cfg)
            }
        },
        None => equal_distribution(num_images, audio_duration, cfg),
    }
}

fn equal_distribution(num_images: usize, audio_duration: f64, cfg: &AssemblyConfig) -> Vec<f64> {
    let base = audio_duration / num_images as f64;
    let clamped = base.clamp(cfg.min_scene_secs, cfg.max_scene_secs);
    vec![clamped; num_images]
}

fn validate_weights(weights: &[f64], num_images: usize) -> ReelResult<()> {
    if weights.len() != num_images {
        return Err(ReelError::config(format!(
            "scene timing has {} entries for {num_images} images",
            weights.len()
        )));
    }
    if weights.iter().any(|&w| !(w.is_finite() && w > 0.0)) {
        return Err(ReelError::config(
            "scene timing entries must be strictly positive",
        ));
    }
    Ok(())
}

/// Build the full composition timeline.
///
/// Start offsets accumulate *display* durations (not clip durations), so a
/// clip's crossfade tail overlaps the head of the next clip. The final
/// scene's clip never extends past the total duration.
pub fn build_timeline(
    num_images: usize,
    audio_duration: f64,
    weights: Option<&[f64]>,
    cfg: &AssemblyConfig,
) -> ReelResult<CompositionTimeline> {
    if num_images == 0 {
        return Err(ReelError::input("no images provided for assembly"));
    }
    if !(audio_duration.is_finite() && audio_duration > 0.0) {
        return Err(ReelError::input(format!(
            "audio duration must be positive, got {audio_duration}"
        )));
    }

    let durations = allocate_durations(num_images, audio_duration, weights, cfg);

    let mut slots = Vec::with_capacity(num_images);
    let mut cursor = 0.0f64;
    for (i, &display_secs) in durations.iter().enumerate() {
        let clip_secs = if i + 1 < num_images {
            display_secs + cfg.crossfade_secs
        } else {
            (display_secs + cfg.crossfade_secs).min((audio_duration - cursor).max(0.0))
        };
        slots.push(SceneSlot {
            image_index: i,
            display_secs,
            clip_secs,
            start_secs: cursor,
            camera: CameraPath::from_index(i),
        });
        cursor += display_secs;
    }

    Ok(CompositionTimeline {
        slots,
        total_secs: audio_duration,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/timeline.rs"]
mod tests;
