use std::sync::Arc;

use crate::config::AssemblyConfig;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::lerp;
use crate::scene::prepare::PreparedCanvas;

/// Camera motion profiles applied over a scene's lifetime.
///
/// The set of eight is a design requirement: consecutive scenes must vary
/// zoom direction and pan axis so the motion never repeats back-to-back.
/// Selection is `index % 8`, deterministic per scene position — never random.
/// The enumeration order is stable; reordering it changes every rendered
/// video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CameraPath {
    /// Zoom in while panning right and down.
    ZoomInRightDown,
    /// Zoom out while panning back left and up.
    ZoomOutLeftUp,
    /// Zoom in while panning left and down.
    ZoomInLeftDown,
    /// Zoom out while panning right and up.
    ZoomOutRightUp,
    /// Zoom in while panning up only.
    ZoomInUp,
    /// Zoom out while panning down only.
    ZoomOutDown,
    /// Zoom in along a diagonal drift.
    ZoomInDiagonal,
    /// Zoom out along the reverse diagonal.
    ZoomOutDiagonal,
}

impl CameraPath {
    /// Number of distinct profiles.
    pub const COUNT: usize = 8;

    /// Deterministic profile for a scene position.
    pub fn from_index(index: usize) -> Self {
        match index % Self::COUNT {
            0 => Self::ZoomInRightDown,
            1 => Self::ZoomOutLeftUp,
            2 => Self::ZoomInLeftDown,
            3 => Self::ZoomOutRightUp,
            4 => Self::ZoomInUp,
            5 => Self::ZoomOutDown,
            6 => Self::ZoomInDiagonal,
            _ => Self::ZoomOutDiagonal,
        }
    }

    /// Interpolation endpoints for this profile under `cfg`'s excursion.
    pub(crate) fn profile(self, cfg: &AssemblyConfig) -> CameraProfile {
        let z = cfg.zoom_factor;
        let px = cfg.pan_range_x;
        let py = cfg.pan_range_y;
        let (start_zoom, end_zoom, start_pan_x, end_pan_x, start_pan_y, end_pan_y) = match self {
            Self::ZoomInRightDown => (1.0, z, 0, px, 0, py),
            Self::ZoomOutLeftUp => (z, 1.0, px, 0, py, 0),
            Self::ZoomInLeftDown => (1.0, z, px, 0, 0, py),
            Self::ZoomOutRightUp => (z, 1.0, 0, px, py, 0),
            Self::ZoomInUp => (1.0, z, 0, 0, py, 0),
            Self::ZoomOutDown => (z, 1.0, 0, 0, 0, py),
            Self::ZoomInDiagonal => (1.0, z, px / 2, px, 0, py),
            Self::ZoomOutDiagonal => (z, 1.0, px, px / 2, py, 0),
        };
        CameraProfile {
            start_zoom,
            end_zoom,
            start_pan_x,
            end_pan_x,
            start_pan_y,
            end_pan_y,
        }
    }
}

/// Zoom/pan interpolation endpoints.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CameraProfile {
    pub(crate) start_zoom: f64,
    pub(crate) end_zoom: f64,
    pub(crate) start_pan_x: i64,
    pub(crate) end_pan_x: i64,
    pub(crate) start_pan_y: i64,
    pub(crate) end_pan_y: i64,
}

/// Crop window `[x1, x2) × [y1, y2)` in working-canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CropWindow {
    pub(crate) x1: u32,
    pub(crate) y1: u32,
    pub(crate) x2: u32,
    pub(crate) y2: u32,
}

impl CropWindow {
    pub(crate) fn width(self) -> u32 {
        self.x2 - self.x1
    }

    pub(crate) fn height(self) -> u32 {
        self.y2 - self.y1
    }
}

/// Compute the crop window at normalized progress `progress`.
///
/// The ideal window is centered on `(canvas_w/2 + pan_x, canvas_h/2 + pan_y)`
/// with size `(⌊out_w/zoom⌋, ⌊out_h/zoom⌋)`. A window that overruns a canvas
/// edge is shifted back in-bounds, never shrunk: the requested crop size is
/// preserved exactly so the zoom level stays truthful.
pub(crate) fn crop_window_at(
    profile: &CameraProfile,
    progress: f64,
    canvas_w: u32,
    canvas_h: u32,
    out_w: u32,
    out_h: u32,
) -> ReelResult<CropWindow> {
    let p = progress.clamp(0.0, 1.0);

    let zoom = lerp(profile.start_zoom, profile.end_zoom, p);
    if !(zoom.is_finite() && zoom >= 1.0) {
        return Err(ReelError::render(format!("invalid zoom {zoom} at progress {p}")));
    }
    let pan_x = lerp(profile.start_pan_x as f64, profile.end_pan_x as f64, p) as i64;
    let pan_y = lerp(profile.start_pan_y as f64, profile.end_pan_y as f64, p) as i64;

    let crop_w = (f64::from(out_w) / zoom).floor() as u32;
    let crop_h = (f64::from(out_h) / zoom).floor() as u32;
    if crop_w == 0 || crop_h == 0 {
        return Err(ReelError::render("crop window collapsed to zero size"));
    }
    if crop_w > canvas_w || crop_h > canvas_h {
        return Err(ReelError::render(format!(
            "crop {crop_w}x{crop_h} exceeds working canvas {canvas_w}x{canvas_h}"
        )));
    }

    let center_x = i64::from(canvas_w / 2) + pan_x;
    let center_y = i64::from(canvas_h / 2) + pan_y;

    // An out-of-bounds window shifts back inside (never shrinks), keeping
    // the requested crop size and therefore the zoom level exact.
    let x1 = (center_x - i64::from(crop_w / 2)).clamp(0, i64::from(canvas_w - crop_w)) as u32;
    let y1 = (center_y - i64::from(crop_h / 2)).clamp(0, i64::from(canvas_h - crop_h)) as u32;

    Ok(CropWindow {
        x1,
        y1,
        x2: x1 + crop_w,
        y2: y1 + crop_h,
    })
}

/// Per-scene animator: maps a time offset into a deterministic
/// crop-and-resample of the scene's working canvas.
///
/// Frame synthesis is a pure function of `(canvas, profile, t, duration)`;
/// one animator is safely shared across render workers.
pub(crate) struct KenBurnsAnimator {
    canvas: Arc<PreparedCanvas>,
    profile: CameraProfile,
    out_w: u32,
    out_h: u32,
    duration_secs: f64,
}

impl KenBurnsAnimator {
    pub(crate) fn new(
        canvas: Arc<PreparedCanvas>,
        path: CameraPath,
        cfg: &AssemblyConfig,
        duration_secs: f64,
    ) -> Self {
        Self {
            canvas,
            profile: path.profile(cfg),
            out_w: cfg.canvas.width,
            out_h: cfg.canvas.height,
            duration_secs,
        }
    }

    /// Render the frame at time offset `t` within the clip.
    pub(crate) fn render_frame(&self, t: f64) -> ReelResult<FrameRGBA> {
        if !t.is_finite() || self.duration_secs <= 0.0 {
            return Err(ReelError::render(format!(
                "invalid frame time {t} for clip duration {}",
                self.duration_secs
            )));
        }
        let progress = (t / self.duration_secs).clamp(0.0, 1.0);
        let win = crop_window_at(
            &self.profile,
            progress,
            self.canvas.width(),
            self.canvas.height(),
            self.out_w,
            self.out_h,
        )?;

        let cropped = image::imageops::crop_imm(
            &self.canvas.rgb,
            win.x1,
            win.y1,
            win.width(),
            win.height(),
        )
        .to_image();
        let resized = image::imageops::resize(
            &cropped,
            self.out_w,
            self.out_h,
            image::imageops::FilterType::Triangle,
        );
        Ok(rgb_to_opaque_frame(&resized))
    }

    /// Non-animated fallback: a fixed output-sized crop of the working
    /// canvas, used when per-frame rendering fails.
    pub(crate) fn static_frame(&self) -> FrameRGBA {
        let w = self.out_w.min(self.canvas.width());
        let h = self.out_h.min(self.canvas.height());
        let cropped = image::imageops::crop_imm(&self.canvas.rgb, 0, 0, w, h).to_image();
        if (w, h) == (self.out_w, self.out_h) {
            rgb_to_opaque_frame(&cropped)
        } else {
            let resized = image::imageops::resize(
                &cropped,
                self.out_w,
                self.out_h,
                image::imageops::FilterType::Triangle,
            );
            rgb_to_opaque_frame(&resized)
        }
    }

    /// Explicit fallback combinator: render `t`, degrade to the static crop
    /// on a per-frame render failure.
    pub(crate) fn render_or_static(&self, t: f64) -> FrameRGBA {
        match self.render_frame(t) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("ken burns frame failed, using static crop: {e}");
                self.static_frame()
            }
        }
    }
}

/// Convert an opaque RGB8 buffer into a premultiplied RGBA8 frame.
pub(crate) fn rgb_to_opaque_frame(rgb: &image::RgbImage) -> FrameRGBA {
    let (w, h) = rgb.dimensions();
    let mut data = Vec::with_capacity((w as usize) * (h as usize) * 4);
    for px in rgb.pixels() {
        data.extend_from_slice(&[px.0[0], px.0[1], px.0[2], 255]);
    }
    FrameRGBA {
        width: w,
        height: h,
        data,
        premultiplied: true,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/ken_burns.rs"]
mod tests;
