use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// Immutable assembly configuration.
///
/// One value is built up front and passed by reference into every component
/// constructor; nothing in the pipeline mutates it after that. The defaults
/// are the engine's fixed output contract: a 1080×1920 @ 30fps vertical
/// short.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AssemblyConfig {
    /// Output canvas dimensions.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Peak Ken Burns zoom factor.
    pub zoom_factor: f64,
    /// Horizontal pan excursion in pixels.
    pub pan_range_x: i64,
    /// Vertical pan excursion in pixels.
    pub pan_range_y: i64,
    /// Per-scene display duration floor in seconds.
    pub min_scene_secs: f64,
    /// Per-scene display duration ceiling in seconds (equal-distribution
    /// fallback only).
    pub max_scene_secs: f64,
    /// Crossfade overlap between adjacent scenes in seconds.
    pub crossfade_secs: f64,
    /// Caption styling.
    pub caption: CaptionStyle,
    /// Background music mixing parameters.
    pub music: MusicMix,
}

/// Burned-in caption styling.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CaptionStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Vertical center of the caption block as a fraction of canvas height.
    pub y_position: f64,
    /// Outline thickness in pixels.
    pub stroke_width: i32,
    /// Glyph fill color, straight RGBA.
    pub fill_rgba: [u8; 4],
    /// Glyph outline color, straight RGBA.
    pub stroke_rgba: [u8; 4],
    /// Background pill alpha (the pill is always black).
    pub bg_alpha: u8,
    /// Padding between the text block and the pill edge, in pixels.
    pub bg_padding: f64,
    /// Pill corner radius in pixels.
    pub bg_radius: f64,
    /// Vertical gap between caption lines in pixels.
    pub line_spacing: f64,
    /// Wrap width as a fraction of canvas width.
    pub max_width_frac: f64,
}

/// Background music mixing parameters.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct MusicMix {
    /// Music gain relative to narration (narration plays at unity).
    pub gain: f32,
    /// Fade-out applied to the music tail, in seconds.
    pub fade_out_secs: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1080,
                height: 1920,
            },
            fps: Fps { num: 30, den: 1 },
            zoom_factor: 1.20,
            pan_range_x: 60,
            pan_range_y: 40,
            min_scene_secs: 4.0,
            max_scene_secs: 14.0,
            crossfade_secs: 1.2,
            caption: CaptionStyle::default(),
            music: MusicMix {
                gain: 0.15,
                fade_out_secs: 2.0,
            },
        }
    }
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 72.0,
            y_position: 0.75,
            stroke_width: 6,
            fill_rgba: [255, 255, 255, 255],
            stroke_rgba: [0, 0, 0, 255],
            bg_alpha: 140,
            bg_padding: 20.0,
            bg_radius: 15.0,
            line_spacing: 10.0,
            max_width_frac: 0.85,
        }
    }
}

impl AssemblyConfig {
    /// Validate invariants the rest of the pipeline assumes.
    pub fn validate(&self) -> ReelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::config("canvas dimensions must be non-zero"));
        }
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(ReelError::config(
                "canvas dimensions must be even (required for yuv420p output)",
            ));
        }
        if !(self.zoom_factor.is_finite() && self.zoom_factor >= 1.0) {
            return Err(ReelError::config("zoom_factor must be >= 1.0"));
        }
        if self.pan_range_x < 0 || self.pan_range_y < 0 {
            return Err(ReelError::config("pan ranges must be non-negative"));
        }
        if !(self.min_scene_secs > 0.0 && self.max_scene_secs >= self.min_scene_secs) {
            return Err(ReelError::config(
                "scene duration bounds must satisfy 0 < min <= max",
            ));
        }
        if self.crossfade_secs < 0.0 {
            return Err(ReelError::config("crossfade_secs must be non-negative"));
        }
        if !(self.caption.max_width_frac > 0.0 && self.caption.max_width_frac <= 1.0) {
            return Err(ReelError::config("caption max_width_frac must be in (0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        AssemblyConfig::default().validate().unwrap();
    }

    #[test]
    fn odd_canvas_is_rejected() {
        let mut cfg = AssemblyConfig::default();
        cfg.canvas.width = 1081;
        assert!(cfg.validate().is_err());
    }
}
