use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Decoded still image, RGB8 row-major.
///
/// Stills are opaque backgrounds here, so there is no alpha channel to
/// carry through the motion pipeline.
#[derive(Clone, Debug)]
pub(crate) struct SourceImage {
    pub(crate) rgb: image::RgbImage,
}

impl SourceImage {
    pub(crate) fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub(crate) fn height(&self) -> u32 {
        self.rgb.height()
    }
}

/// Decode a still image from disk.
///
/// Any decode failure maps to [`ReelError::ImageLoad`] so the caller can
/// recover with the static-crop fallback for that scene alone.
pub(crate) fn decode_image_file(path: &Path) -> ReelResult<SourceImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| ReelError::image_load(format!("read '{}': {e}", path.display())))?;
    decode_image(&bytes).map_err(|e| {
        ReelError::image_load(format!("decode '{}': {e}", path.display()))
    })
}

/// Decode encoded image bytes and convert to RGB8.
pub(crate) fn decode_image(bytes: &[u8]) -> ReelResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(SourceImage {
        rgb: dyn_img.to_rgb8(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_bytes() {
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        let src = decode_image(&bytes).unwrap();
        assert_eq!((src.width(), src.height()), (3, 2));
        assert_eq!(src.rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn garbage_bytes_fail() {
        assert!(decode_image(b"not an image").is_err());
    }

    #[test]
    fn missing_file_is_image_load_error() {
        let err = decode_image_file(Path::new("/nonexistent/image.png")).unwrap_err();
        assert!(matches!(err, ReelError::ImageLoad(_)));
    }
}
