use crate::foundation::error::ReelResult;

/// One wrapped caption line with its measured extents.
#[derive(Clone, Debug)]
pub(crate) struct LineBox {
    pub(crate) text: String,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

/// A measured caption block: wrapped lines stacked with fixed spacing.
#[derive(Clone, Debug)]
pub(crate) struct CaptionBlock {
    pub(crate) lines: Vec<LineBox>,
    pub(crate) max_line_width: f64,
    pub(crate) total_height: f64,
}

/// Greedy word wrap against `max_width`.
///
/// A word joins the current line unless the joined line measures wider than
/// `max_width`; packing is deterministic for a deterministic measurer. A
/// single word wider than `max_width` still gets its own (overflowing) line
/// rather than being split.
pub(crate) fn wrap_greedy(
    text: &str,
    max_width: f64,
    measure: &mut dyn FnMut(&str) -> ReelResult<f64>,
) -> ReelResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate)? <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}

/// Measure wrapped lines and stack them into a block.
pub(crate) fn layout_block(
    lines: Vec<String>,
    line_spacing: f64,
    measure: &mut dyn FnMut(&str) -> ReelResult<(f64, f64)>,
) -> ReelResult<CaptionBlock> {
    let mut boxes = Vec::with_capacity(lines.len());
    let mut max_line_width = 0.0f64;
    let mut total_height = 0.0f64;

    for text in lines {
        let (width, height) = measure(&text)?;
        max_line_width = max_line_width.max(width);
        total_height += height;
        boxes.push(LineBox {
            text,
            width,
            height,
        });
    }

    if boxes.len() > 1 {
        total_height += (boxes.len() - 1) as f64 * line_spacing;
    }

    Ok(CaptionBlock {
        lines: boxes,
        max_line_width,
        total_height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/captions/layout.rs"]
mod tests;
