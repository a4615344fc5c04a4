use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};

/// Capability interface for resolving the caption font.
///
/// Injected into the caption compositor instead of hardcoding platform font
/// paths; resolution never fails, it degrades to the built-in bitmap font.
pub trait FontProvider: Send + Sync {
    /// Resolve the best available caption font.
    fn resolve(&self) -> ResolvedFont;
}

/// Outcome of font resolution.
#[derive(Clone)]
pub enum ResolvedFont {
    /// TrueType/OpenType bytes, shaped with Parley and stroke-outlined.
    Outline(Arc<Vec<u8>>),
    /// Degraded built-in bitmap font. No stroke support, still readable.
    Bitmap(BuiltinFont),
}

/// Probes a prioritized list of font files and returns the first that reads.
pub struct SystemFontProvider {
    candidates: Vec<PathBuf>,
}

impl SystemFontProvider {
    /// Provider over an explicit candidate list, tried in order.
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Common bold faces across Linux and macOS installs.
    pub fn default_bold() -> Self {
        let candidates = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
            "/Library/Fonts/Arial Bold.ttf",
        ]
        .into_iter()
        .map(PathBuf::from)
        .collect();
        Self { candidates }
    }
}

impl FontProvider for SystemFontProvider {
    fn resolve(&self) -> ResolvedFont {
        for path in &self.candidates {
            match std::fs::read(path) {
                Ok(bytes) if !bytes.is_empty() => {
                    tracing::debug!(font = %path.display(), "caption font resolved");
                    return ResolvedFont::Outline(Arc::new(bytes));
                }
                _ => continue,
            }
        }
        tracing::warn!("no caption font available, using built-in bitmap font");
        ResolvedFont::Bitmap(BuiltinFont)
    }
}

/// Provider that always yields the degraded bitmap font. Used by tests and
/// headless environments with no fonts installed.
pub struct BuiltinFontProvider;

impl FontProvider for BuiltinFontProvider {
    fn resolve(&self) -> ResolvedFont {
        ResolvedFont::Bitmap(BuiltinFont)
    }
}

/// Minimal built-in 8×8 bitmap font.
///
/// Uppercase-only glyph table (lowercase input is folded); anything outside
/// the table renders as a hollow box. Glyph rows are LSB-leftmost bitmasks,
/// scaled by an integer factor derived from the configured font size.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinFont;

impl BuiltinFont {
    /// Integer cell upscale factor for a requested pixel size.
    pub fn scale_for_size(font_size: f32) -> u32 {
        ((font_size / 8.0).round() as u32).max(1)
    }

    /// Horizontal advance per character at `scale`.
    pub fn advance(scale: u32) -> f64 {
        f64::from(8 * scale)
    }

    /// Line height at `scale`.
    pub fn line_height(scale: u32) -> f64 {
        f64::from(8 * scale)
    }

    /// Measured width of `text` at `scale` (monospace advance).
    pub fn measure(text: &str, scale: u32) -> f64 {
        Self::advance(scale) * text.chars().count() as f64
    }

    /// 8×8 glyph rows for `ch`, LSB = leftmost pixel.
    pub(crate) fn glyph(ch: char) -> [u8; 8] {
        let ch = ch.to_ascii_uppercase();
        match ch {
            ' ' => [0x00; 8],
            'A' => [0x0C, 0x1E, 0x33, 0x33, 0x3F, 0x33, 0x33, 0x00],
            'B' => [0x3F, 0x66, 0x66, 0x3E, 0x66, 0x66, 0x3F, 0x00],
            'C' => [0x3C, 0x66, 0x03, 0x03, 0x03, 0x66, 0x3C, 0x00],
            'D' => [0x1F, 0x36, 0x66, 0x66, 0x66, 0x36, 0x1F, 0x00],
            'E' => [0x7F, 0x46, 0x16, 0x1E, 0x16, 0x46, 0x7F, 0x00],
            'F' => [0x7F, 0x46, 0x16, 0x1E, 0x16, 0x06, 0x0F, 0x00],
            'G' => [0x3C, 0x66, 0x03, 0x03, 0x73, 0x66, 0x7C, 0x00],
            'H' => [0x33, 0x33, 0x33, 0x3F, 0x33, 0x33, 0x33, 0x00],
            'I' => [0x1E, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x1E, 0x00],
            'J' => [0x78, 0x30, 0x30, 0x30, 0x33, 0x33, 0x1E, 0x00],
            'K' => [0x67, 0x66, 0x36, 0x1E, 0x36, 0x66, 0x67, 0x00],
            'L' => [0x0F, 0x06, 0x06, 0x06, 0x46, 0x66, 0x7F, 0x00],
            'M' => [0x63, 0x77, 0x7F, 0x7F, 0x6B, 0x63, 0x63, 0x00],
            'N' => [0x63, 0x67, 0x6F, 0x7B, 0x73, 0x63, 0x63, 0x00],
            'O' => [0x1C, 0x36, 0x63, 0x63, 0x63, 0x36, 0x1C, 0x00],
            'P' => [0x3F, 0x66, 0x66, 0x3E, 0x06, 0x06, 0x0F, 0x00],
            'Q' => [0x1E, 0x33, 0x33, 0x33, 0x3B, 0x1E, 0x38, 0x00],
            'R' => [0x3F, 0x66, 0x66, 0x3E, 0x36, 0x66, 0x67, 0x00],
            'S' => [0x1E, 0x33, 0x07, 0x0E, 0x38, 0x33, 0x1E, 0x00],
            'T' => [0x3F, 0x2D, 0x0C, 0x0C, 0x0C, 0x0C, 0x1E, 0x00],
            'U' => [0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x3F, 0x00],
            'V' => [0x33, 0x33, 0x33, 0x33, 0x33, 0x1E, 0x0C, 0x00],
            'W' => [0x63, 0x63, 0x63, 0x6B, 0x7F, 0x77, 0x63, 0x00],
            'X' => [0x63, 0x63, 0x36, 0x1C, 0x1C, 0x36, 0x63, 0x00],
            'Y' => [0x33, 0x33, 0x33, 0x1E, 0x0C, 0x0C, 0x1E, 0x00],
            'Z' => [0x7F, 0x63, 0x31, 0x18, 0x4C, 0x66, 0x7F, 0x00],
            '0' => [0x3E, 0x63, 0x73, 0x7B, 0x6F, 0x67, 0x3E, 0x00],
            '1' => [0x0C, 0x0E, 0x0C, 0x0C, 0x0C, 0x0C, 0x3F, 0x00],
            '2' => [0x1E, 0x33, 0x30, 0x1C, 0x06, 0x33, 0x3F, 0x00],
            '3' => [0x1E, 0x33, 0x30, 0x1C, 0x30, 0x33, 0x1E, 0x00],
            '4' => [0x38, 0x3C, 0x36, 0x33, 0x7F, 0x30, 0x78, 0x00],
            '5' => [0x3F, 0x03, 0x1F, 0x30, 0x30, 0x33, 0x1E, 0x00],
            '6' => [0x1C, 0x06, 0x03, 0x1F, 0x33, 0x33, 0x1E, 0x00],
            '7' => [0x3F, 0x33, 0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x00],
            '8' => [0x1E, 0x33, 0x33, 0x1E, 0x33, 0x33, 0x1E, 0x00],
            '9' => [0x1E, 0x33, 0x33, 0x3E, 0x30, 0x18, 0x0E, 0x00],
            '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x00],
            ',' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C, 0x06],
            '!' => [0x0C, 0x1E, 0x1E, 0x0C, 0x0C, 0x00, 0x0C, 0x00],
            '?' => [0x1E, 0x33, 0x30, 0x18, 0x0C, 0x00, 0x0C, 0x00],
            '\'' => [0x0C, 0x0C, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00],
            '"' => [0x36, 0x36, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            '-' => [0x00, 0x00, 0x00, 0x3F, 0x00, 0x00, 0x00, 0x00],
            ':' => [0x00, 0x0C, 0x0C, 0x00, 0x00, 0x0C, 0x0C, 0x00],
            ';' => [0x00, 0x0C, 0x0C, 0x00, 0x00, 0x0C, 0x0C, 0x06],
            '(' => [0x18, 0x0C, 0x06, 0x06, 0x06, 0x0C, 0x18, 0x00],
            ')' => [0x06, 0x0C, 0x18, 0x18, 0x18, 0x0C, 0x06, 0x00],
            '/' => [0x60, 0x30, 0x18, 0x0C, 0x06, 0x03, 0x01, 0x00],
            '&' => [0x1C, 0x36, 0x1C, 0x6E, 0x3B, 0x33, 0x6E, 0x00],
            '%' => [0x00, 0x63, 0x33, 0x18, 0x0C, 0x66, 0x63, 0x00],
            _ => [0x7E, 0x42, 0x42, 0x42, 0x42, 0x42, 0x7E, 0x00],
        }
    }
}

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out a single line of text using the provided font bytes.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::config("caption size_px must be finite and > 0"));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ReelError::config("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::config("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        Ok(layout)
    }
}
