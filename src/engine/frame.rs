use std::sync::Arc;

use smallvec::SmallVec;

use crate::captions::render::ScheduledCaption;
use crate::config::AssemblyConfig;
use crate::effects::composite::over_in_place;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::ken_burns::KenBurnsAnimator;
use crate::scene::timeline::SceneSlot;

/// Pixel source for one scene layer.
pub(crate) enum SceneSource {
    /// Animated Ken Burns rendering from the prepared working canvas.
    Animated(KenBurnsAnimator),
    /// Pre-rendered static frame (fallback for scenes that failed to
    /// prepare or animate).
    Static(Arc<FrameRGBA>),
}

/// One scene's contribution to the composition: a pixel source plus its
/// slot and fade behavior.
pub(crate) struct SceneLayer {
    pub(crate) slot: SceneSlot,
    pub(crate) source: SceneSource,
    pub(crate) fades_in: bool,
    pub(crate) fades_out: bool,
}

impl SceneLayer {
    pub(crate) fn active_at(&self, t: f64) -> bool {
        t >= self.slot.start_secs && t < self.slot.start_secs + self.slot.clip_secs
    }

    /// Linear fade opacity at absolute time `t`.
    ///
    /// Fade-in covers the first crossfade interval of the clip, fade-out the
    /// last; the ramps multiply so very short clips stay well-defined.
    pub(crate) fn opacity_at(&self, t: f64, crossfade_secs: f64) -> f32 {
        if crossfade_secs <= 0.0 {
            return 1.0;
        }
        let local = t - self.slot.start_secs;
        let mut opacity = 1.0f64;
        if self.fades_in {
            opacity *= (local / crossfade_secs).clamp(0.0, 1.0);
        }
        if self.fades_out {
            opacity *= ((self.slot.clip_secs - local) / crossfade_secs).clamp(0.0, 1.0);
        }
        opacity as f32
    }

    fn frame_at(&self, t: f64) -> Arc<FrameRGBA> {
        match &self.source {
            SceneSource::Animated(animator) => {
                Arc::new(animator.render_or_static(t - self.slot.start_secs))
            }
            SceneSource::Static(frame) => frame.clone(),
        }
    }
}

/// Compose the output frame at absolute time `t`.
///
/// Pure in `(t, layers, captions)`: active scene layers blend bottom-up in
/// timeline order with their fade opacity, then every visible caption
/// overlay blends on top. Safe to evaluate from any worker thread.
pub(crate) fn compose_frame(
    t: f64,
    layers: &[SceneLayer],
    captions: &[ScheduledCaption],
    cfg: &AssemblyConfig,
) -> ReelResult<FrameRGBA> {
    let width = cfg.canvas.width;
    let height = cfg.canvas.height;
    let len = (width as usize) * (height as usize) * 4;

    // Opaque black base; scenes with partial opacity fade from/to it.
    let mut data = vec![0u8; len];
    for px in data.chunks_exact_mut(4) {
        px[3] = 255;
    }

    let active: SmallVec<[(&SceneLayer, f32); 2]> = layers
        .iter()
        .filter(|l| l.active_at(t))
        .map(|l| (l, l.opacity_at(t, cfg.crossfade_secs)))
        .collect();

    for (layer, opacity) in active {
        if opacity <= 0.0 {
            continue;
        }
        let frame = layer.frame_at(t);
        if frame.data.len() != len {
            return Err(ReelError::render(format!(
                "scene {} produced a {}x{} frame for a {width}x{height} canvas",
                layer.slot.image_index, frame.width, frame.height
            )));
        }
        over_in_place(&mut data, &frame.data, opacity)?;
    }

    for caption in captions.iter().filter(|c| c.visible_at(t)) {
        if caption.frame.data.len() != len {
            return Err(ReelError::render(
                "caption overlay size mismatch with output canvas",
            ));
        }
        over_in_place(&mut data, &caption.frame.data, 1.0)?;
    }

    Ok(FrameRGBA {
        width,
        height,
        data,
        premultiplied: true,
    })
}
