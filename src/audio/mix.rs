use std::path::Path;

use crate::assets::media::{AudioPcm, MIX_SAMPLE_RATE};
use crate::config::MusicMix;
use crate::foundation::error::{ReelError, ReelResult};

/// Mix narration and optional background music into interleaved stereo PCM
/// covering exactly `total_secs`.
///
/// Narration plays at unity gain and defines the mix length; music is looped
/// or trimmed to fit, attenuated well below the narration, and faded out at
/// the tail. The result is clamped to `[-1, 1]`.
pub(crate) fn build_soundtrack(
    narration: &AudioPcm,
    music: Option<&AudioPcm>,
    total_secs: f64,
    mix: &MusicMix,
) -> Vec<f32> {
    let total_frames = (total_secs * f64::from(MIX_SAMPLE_RATE)).round().max(0.0) as usize;
    let mut out = vec![0.0f32; total_frames * 2];

    let take = narration.interleaved_f32.len().min(out.len());
    out[..take].copy_from_slice(&narration.interleaved_f32[..take]);

    if let Some(music) = music {
        let looped = loop_or_trim_stereo(&music.interleaved_f32, total_frames);
        let fade_frames =
            ((mix.fade_out_secs.max(0.0)) * f64::from(MIX_SAMPLE_RATE)).round() as usize;
        for frame in 0..total_frames {
            let gain = mix.gain * tail_fade_gain(frame, total_frames, fade_frames);
            let idx = frame * 2;
            out[idx] += looped[idx] * gain;
            out[idx + 1] += looped[idx + 1] * gain;
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Loop interleaved stereo PCM until it covers `total_frames`, then trim to
/// exactly that length. Empty input yields silence.
pub(crate) fn loop_or_trim_stereo(src: &[f32], total_frames: usize) -> Vec<f32> {
    let needed = total_frames * 2;
    let mut out = Vec::with_capacity(needed);
    if src.len() < 2 {
        out.resize(needed, 0.0);
        return out;
    }
    while out.len() < needed {
        let take = (needed - out.len()).min(src.len());
        out.extend_from_slice(&src[..take]);
    }
    out
}

fn tail_fade_gain(frame: usize, total_frames: usize, fade_frames: usize) -> f32 {
    if fade_frames == 0 {
        return 1.0;
    }
    let remaining = total_frames.saturating_sub(frame);
    if remaining >= fade_frames {
        1.0
    } else {
        remaining as f32 / fade_frames as f32
    }
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub(crate) fn write_mix_to_f32le_file(
    samples_interleaved: &[f32],
    out_path: &Path,
) -> ReelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ReelError::encode(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        ReelError::encode(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}
