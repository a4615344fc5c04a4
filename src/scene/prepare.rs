use std::path::Path;

use crate::assets::decode::{SourceImage, decode_image_file};
use crate::config::AssemblyConfig;
use crate::foundation::error::ReelResult;

/// Working canvas for one scene: the source image cover-fitted and
/// center-cropped to a buffer large enough for the maximum zoom/pan
/// excursion, so every crop window the animator asks for stays in-bounds.
#[derive(Clone, Debug)]
pub(crate) struct PreparedCanvas {
    pub(crate) rgb: image::RgbImage,
}

impl PreparedCanvas {
    pub(crate) fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub(crate) fn height(&self) -> u32 {
        self.rgb.height()
    }
}

/// Working canvas dimensions for the configured zoom/pan excursion:
/// `(⌊W·zoom⌋ + 2·pan_x, ⌊H·zoom⌋ + 2·pan_y)`.
pub(crate) fn working_canvas_size(cfg: &AssemblyConfig) -> (u32, u32) {
    let w = (f64::from(cfg.canvas.width) * cfg.zoom_factor).floor() as u32
        + 2 * cfg.pan_range_x.unsigned_abs() as u32;
    let h = (f64::from(cfg.canvas.height) * cfg.zoom_factor).floor() as u32
        + 2 * cfg.pan_range_y.unsigned_abs() as u32;
    (w, h)
}

/// Decode and prepare one scene's working canvas.
pub(crate) fn prepare(path: &Path, cfg: &AssemblyConfig) -> ReelResult<PreparedCanvas> {
    let src = decode_image_file(path)?;
    let (target_w, target_h) = working_canvas_size(cfg);
    Ok(PreparedCanvas {
        rgb: cover_fit_crop(&src, target_w, target_h),
    })
}

/// Decode and cover-fit a scene image to exactly the output resolution.
///
/// This is the non-animated fallback used when the Ken Burns path fails.
pub(crate) fn prepare_static(path: &Path, cfg: &AssemblyConfig) -> ReelResult<image::RgbImage> {
    let src = decode_image_file(path)?;
    Ok(cover_fit_crop(&src, cfg.canvas.width, cfg.canvas.height))
}

/// Cover-fit `src` to fill `(target_w, target_h)` and center-crop the excess.
///
/// Scale is `max(target_w/w, target_h/h)`, so the target is always fully
/// covered and never letterboxed.
fn cover_fit_crop(src: &SourceImage, target_w: u32, target_h: u32) -> image::RgbImage {
    let (orig_w, orig_h) = (src.width(), src.height());
    let scale = f64::max(
        f64::from(target_w) / f64::from(orig_w),
        f64::from(target_h) / f64::from(orig_h),
    );
    let new_w = ((f64::from(orig_w) * scale) as u32).max(target_w);
    let new_h = ((f64::from(orig_h) * scale) as u32).max(target_h);

    let resized = image::imageops::resize(
        &src.rgb,
        new_w,
        new_h,
        image::imageops::FilterType::Lanczos3,
    );

    let left = (new_w - target_w) / 2;
    let top = (new_h - target_h) / 2;
    image::imageops::crop_imm(&resized, left, top, target_w, target_h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(w: u32, h: u32) -> SourceImage {
        SourceImage {
            rgb: image::RgbImage::from_pixel(w, h, image::Rgb([100, 150, 200])),
        }
    }

    #[test]
    fn working_canvas_matches_excursion() {
        let cfg = AssemblyConfig::default();
        let (w, h) = working_canvas_size(&cfg);
        // 1080 * 1.2 + 120, 1920 * 1.2 + 80
        assert_eq!((w, h), (1416, 2384));
    }

    #[test]
    fn cover_fit_output_is_exact() {
        let out = cover_fit_crop(&src(400, 300), 200, 100);
        assert_eq!((out.width(), out.height()), (200, 100));
    }

    #[test]
    fn cover_fit_handles_portrait_into_landscape() {
        let out = cover_fit_crop(&src(100, 500), 300, 100);
        assert_eq!((out.width(), out.height()), (300, 100));
    }

    #[test]
    fn cover_fit_upscales_small_sources() {
        let out = cover_fit_crop(&src(10, 10), 64, 32);
        assert_eq!((out.width(), out.height()), (64, 32));
    }
}
