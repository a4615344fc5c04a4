use std::sync::Arc;

use crate::assets::fonts::{BuiltinFont, FontProvider, ResolvedFont, TextBrushRgba8, TextLayoutEngine};
use crate::captions::layout::{CaptionBlock, layout_block, wrap_greedy};
use crate::config::AssemblyConfig;
use crate::effects::composite;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{ReelError, ReelResult};

/// A contiguous span of caption text with its on-screen window in seconds.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CaptionChunk {
    /// Caption text.
    pub text: String,
    /// On-screen time in seconds.
    pub start: f64,
    /// Off-screen time in seconds; clamped to the total duration before use.
    pub end: f64,
}

/// A rasterized caption with its scheduled window.
#[derive(Clone, Debug)]
pub(crate) struct ScheduledCaption {
    pub(crate) frame: Arc<FrameRGBA>,
    pub(crate) start_secs: f64,
    pub(crate) duration_secs: f64,
}

impl ScheduledCaption {
    pub(crate) fn visible_at(&self, t: f64) -> bool {
        t >= self.start_secs && t < self.start_secs + self.duration_secs
    }
}

/// Rasterizes caption chunks into full-frame premultiplied RGBA overlays.
///
/// Text is drawn with a thick outline by stamping every glyph run eight
/// times at the stroke offsets and once more centered in the fill color; the
/// degraded bitmap font draws the fill pass only.
pub(crate) struct CaptionCompositor {
    cfg: AssemblyConfig,
    font: ResolvedFont,
    engine: TextLayoutEngine,
}

impl CaptionCompositor {
    pub(crate) fn new(cfg: &AssemblyConfig, fonts: &dyn FontProvider) -> Self {
        Self {
            cfg: cfg.clone(),
            font: fonts.resolve(),
            engine: TextLayoutEngine::new(),
        }
    }

    /// Rasterize and schedule all chunks against the total duration.
    ///
    /// Chunks whose clipped window is empty or whose trimmed text is empty
    /// are skipped, not errors; a chunk that fails to rasterize is dropped
    /// with a warning so one bad chunk cannot abort the assembly.
    pub(crate) fn schedule(
        &mut self,
        chunks: &[CaptionChunk],
        total_secs: f64,
    ) -> Vec<ScheduledCaption> {
        let mut out = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let text = chunk.text.trim();
            let end = chunk.end.min(total_secs);
            let duration = end - chunk.start;
            if duration <= 0.0 || text.is_empty() {
                tracing::debug!(
                    start = chunk.start,
                    end = chunk.end,
                    "skipping empty caption chunk"
                );
                continue;
            }

            match self.render_chunk(text) {
                Ok(frame) => out.push(ScheduledCaption {
                    frame: Arc::new(frame),
                    start_secs: chunk.start,
                    duration_secs: duration,
                }),
                Err(e) => {
                    tracing::warn!("dropping caption chunk ({e}): {text:?}");
                }
            }
        }
        out
    }

    /// Rasterize one chunk into a full-frame transparent overlay.
    pub(crate) fn render_chunk(&mut self, text: &str) -> ReelResult<FrameRGBA> {
        let max_width = f64::from(self.cfg.canvas.width) * self.cfg.caption.max_width_frac;
        match self.font.clone() {
            ResolvedFont::Outline(bytes) => self.render_outline(text, &bytes, max_width),
            ResolvedFont::Bitmap(_) => self.render_bitmap(text, max_width),
        }
    }

    fn render_outline(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        max_width: f64,
    ) -> ReelResult<FrameRGBA> {
        let style = self.cfg.caption.clone();
        let size = style.font_size;
        let fill = style.fill_rgba;
        let brush = TextBrushRgba8 {
            r: fill[0],
            g: fill[1],
            b: fill[2],
            a: fill[3],
        };

        let engine = &mut self.engine;
        let lines = {
            let mut measure = |s: &str| -> ReelResult<f64> {
                Ok(f64::from(
                    engine.layout_line(s, font_bytes, size, brush)?.full_width(),
                ))
            };
            wrap_greedy(text, max_width, &mut measure)?
        };

        let engine = &mut self.engine;
        let block = {
            let mut measure = |s: &str| -> ReelResult<(f64, f64)> {
                let layout = engine.layout_line(s, font_bytes, size, brush)?;
                Ok((f64::from(layout.full_width()), f64::from(layout.height())))
            };
            layout_block(lines, style.line_spacing, &mut measure)?
        };
        if block.lines.is_empty() {
            return Ok(FrameRGBA::transparent(
                self.cfg.canvas.width,
                self.cfg.canvas.height,
            ));
        }

        let (ctx_w, ctx_h) = self.ctx_dims()?;
        let mut ctx = vello_cpu::RenderContext::new(ctx_w, ctx_h);

        let geom = self.block_geometry(&block);
        draw_pill(&mut ctx, &geom, &style);

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes.to_vec()), 0);

        let stroke = style.stroke_rgba;
        let sw = f64::from(style.stroke_width);
        let stroke_offsets = [
            (-sw, -sw),
            (0.0, -sw),
            (sw, -sw),
            (-sw, 0.0),
            (sw, 0.0),
            (-sw, sw),
            (0.0, sw),
            (sw, sw),
        ];

        let mut y = geom.block_top;
        for line in &block.lines {
            let layout = self.engine.layout_line(&line.text, font_bytes, size, brush)?;
            let x = geom.center_x - line.width / 2.0;

            for (ox, oy) in stroke_offsets {
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    stroke[0], stroke[1], stroke[2], stroke[3],
                ));
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((x + ox, y + oy)));
                draw_layout_glyphs(&mut ctx, &layout, &font);
            }

            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                fill[0], fill[1], fill[2], fill[3],
            ));
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
            draw_layout_glyphs(&mut ctx, &layout, &font);

            y += line.height + style.line_spacing;
        }

        self.read_back(ctx)
    }

    fn render_bitmap(&mut self, text: &str, max_width: f64) -> ReelResult<FrameRGBA> {
        let style = self.cfg.caption.clone();
        let scale = BuiltinFont::scale_for_size(style.font_size);
        let line_height = BuiltinFont::line_height(scale);

        let lines = {
            let mut measure = |s: &str| -> ReelResult<f64> { Ok(BuiltinFont::measure(s, scale)) };
            wrap_greedy(text, max_width, &mut measure)?
        };
        let block = {
            let mut measure =
                |s: &str| -> ReelResult<(f64, f64)> { Ok((BuiltinFont::measure(s, scale), line_height)) };
            layout_block(lines, style.line_spacing, &mut measure)?
        };
        if block.lines.is_empty() {
            return Ok(FrameRGBA::transparent(
                self.cfg.canvas.width,
                self.cfg.canvas.height,
            ));
        }

        let (ctx_w, ctx_h) = self.ctx_dims()?;
        let mut ctx = vello_cpu::RenderContext::new(ctx_w, ctx_h);
        let geom = self.block_geometry(&block);
        draw_pill(&mut ctx, &geom, &style);
        let mut frame = self.read_back(ctx)?;

        // No stroke support in the degraded font: fill pass only.
        let mut y = geom.block_top;
        for line in &block.lines {
            let x = geom.center_x - line.width / 2.0;
            stamp_bitmap_line(&mut frame, &line.text, x, y, scale, style.fill_rgba)?;
            y += line.height + style.line_spacing;
        }
        Ok(frame)
    }

    fn ctx_dims(&self) -> ReelResult<(u16, u16)> {
        let w: u16 = self
            .cfg
            .canvas
            .width
            .try_into()
            .map_err(|_| ReelError::render("caption canvas width exceeds u16"))?;
        let h: u16 = self
            .cfg
            .canvas
            .height
            .try_into()
            .map_err(|_| ReelError::render("caption canvas height exceeds u16"))?;
        Ok((w, h))
    }

    fn block_geometry(&self, block: &CaptionBlock) -> BlockGeometry {
        let center_x = f64::from(self.cfg.canvas.width) / 2.0;
        let center_y = f64::from(self.cfg.canvas.height) * self.cfg.caption.y_position;
        let block_top = center_y - block.total_height / 2.0;
        BlockGeometry {
            center_x,
            block_top,
            block_width: block.max_line_width,
            block_height: block.total_height,
        }
    }

    fn read_back(&self, mut ctx: vello_cpu::RenderContext) -> ReelResult<FrameRGBA> {
        let (w, h) = self.ctx_dims()?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data: pixmap.data_as_u8_slice_mut().to_vec(),
            premultiplied: true,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct BlockGeometry {
    center_x: f64,
    block_top: f64,
    block_width: f64,
    block_height: f64,
}

fn draw_pill(
    ctx: &mut vello_cpu::RenderContext,
    geom: &BlockGeometry,
    style: &crate::config::CaptionStyle,
) {
    let pad = style.bg_padding;
    let rect = kurbo::RoundedRect::new(
        geom.center_x - geom.block_width / 2.0 - pad,
        geom.block_top - pad,
        geom.center_x + geom.block_width / 2.0 + pad,
        geom.block_top + geom.block_height + pad,
        style.bg_radius,
    );
    let path = {
        use kurbo::Shape as _;
        rect.to_path(0.1)
    };

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, style.bg_alpha));
    ctx.fill_path(&bezpath_to_cpu(&path));
}

fn draw_layout_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

/// Stamp one line of the built-in bitmap font into a premultiplied frame.
fn stamp_bitmap_line(
    frame: &mut FrameRGBA,
    text: &str,
    x: f64,
    y: f64,
    scale: u32,
    fill_rgba: [u8; 4],
) -> ReelResult<()> {
    let premul = premul_from_straight(fill_rgba);
    let advance = BuiltinFont::advance(scale) as i64;
    let s = i64::from(scale);

    let mut pen_x = x.round() as i64;
    let pen_y = y.round() as i64;
    for ch in text.chars() {
        let rows = BuiltinFont::glyph(ch);
        for (gy, row) in rows.iter().enumerate() {
            for gx in 0..8i64 {
                if row & (1 << gx) == 0 {
                    continue;
                }
                fill_block(
                    frame,
                    pen_x + gx * s,
                    pen_y + gy as i64 * s,
                    s,
                    premul,
                )?;
            }
        }
        pen_x += advance;
    }
    Ok(())
}

fn fill_block(frame: &mut FrameRGBA, x: i64, y: i64, size: i64, premul: [u8; 4]) -> ReelResult<()> {
    let (w, h) = (i64::from(frame.width), i64::from(frame.height));
    for py in y..(y + size) {
        if py < 0 || py >= h {
            continue;
        }
        for px in x..(x + size) {
            if px < 0 || px >= w {
                continue;
            }
            let idx = ((py * w + px) * 4) as usize;
            let dst = [
                frame.data[idx],
                frame.data[idx + 1],
                frame.data[idx + 2],
                frame.data[idx + 3],
            ];
            let out = composite::over(dst, premul, 1.0);
            frame.data[idx..idx + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

fn premul_from_straight(rgba: [u8; 4]) -> [u8; 4] {
    let a = u16::from(rgba[3]);
    let premul = |c: u8| -> u8 { ((u16::from(c) * a + 127) / 255) as u8 };
    [premul(rgba[0]), premul(rgba[1]), premul(rgba[2]), rgba[3]]
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
