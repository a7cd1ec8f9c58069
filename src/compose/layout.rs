use crate::foundation::core::{Captions, Point, Rgba8, Size};
use crate::render::target::TextMeasure;

/// Layout and styling constants for caption compositing.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposeOpts {
    /// Longest allowed display side; larger sources are scaled down uniformly.
    pub max_display_size: u32,
    /// Inset from the canvas edges, in pixels, for both text blocks and wrap width.
    pub padding: u32,
    /// Lower bound on the caption font size.
    pub min_font_px: u32,
    /// Font size is `display_width / font_divisor` (floored) above the minimum.
    pub font_divisor: u32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f64,
    /// Lower bound on the outline width.
    pub min_stroke_px: u32,
    /// Outline width is `font_size / stroke_divisor` (floored) above the minimum.
    pub stroke_divisor: u32,
    /// Caption fill color.
    pub text_color: Rgba8,
    /// Caption outline color.
    pub outline_color: Rgba8,
    /// Background of the decode-failure surface.
    pub failure_background: Rgba8,
    /// Font size of the decode-failure message.
    pub failure_font_px: f32,
    /// Message drawn on the decode-failure surface.
    pub failure_message: String,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            max_display_size: 600,
            padding: 12,
            min_font_px: 24,
            font_divisor: 18,
            line_height_factor: 1.2,
            min_stroke_px: 2,
            stroke_divisor: 10,
            text_color: Rgba8::WHITE,
            outline_color: Rgba8::BLACK,
            failure_background: Rgba8::opaque(0x33, 0x33, 0x33),
            failure_font_px: 16.0,
            failure_message: "Image failed to load".to_string(),
        }
    }
}

/// Lines of one caption block, stacked downward from `y_start`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Wrapped lines; never empty (a blank caption is one empty line).
    pub lines: Vec<String>,
    /// Top edge of the first line.
    pub y_start: f64,
    /// Vertical distance between consecutive line tops.
    pub line_height: f64,
}

impl TextBlock {
    /// Top edge of line `i`.
    pub fn line_y(&self, i: usize) -> f64 {
        self.y_start + i as f64 * self.line_height
    }

    /// Total height reserved by the block.
    pub fn height(&self) -> f64 {
        self.lines.len() as f64 * self.line_height
    }

    /// `(line, top)` pairs in draw order.
    pub fn placed(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), self.line_y(i)))
    }
}

/// Derived layout for one render. Never persisted; recomputed on every caption change.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    /// Canvas width after scaling.
    pub display_width: u32,
    /// Canvas height after scaling.
    pub display_height: u32,
    /// Caption font size.
    pub font_size_px: u32,
    /// Caption line height.
    pub line_height_px: f64,
    /// Caption outline width.
    pub stroke_width_px: u32,
    /// Top-anchored caption.
    pub top: TextBlock,
    /// Bottom-anchored caption.
    pub bottom: TextBlock,
}

impl RenderPlan {
    /// Horizontal center every line is aligned on.
    pub fn center_x(&self) -> f64 {
        f64::from(self.display_width) / 2.0
    }

    /// Canvas size.
    pub fn display_size(&self) -> Size {
        Size::new(f64::from(self.display_width), f64::from(self.display_height))
    }

    /// Anchor of a line whose top edge is at `y`.
    pub fn anchor(&self, y: f64) -> Point {
        Point::new(self.center_x(), y)
    }
}

/// Fit `(w, h)` inside a `max x max` box.
///
/// Sizes that already fit are returned unchanged. Otherwise both sides are multiplied by
/// `min(max / w, max / h)` and rounded independently, so the aspect ratio may drift by a
/// sub-pixel amount.
pub fn scale_size(w: u32, h: u32, max: u32) -> (u32, u32) {
    if w <= max && h <= max {
        return (w, h);
    }
    let r = (f64::from(max) / f64::from(w)).min(f64::from(max) / f64::from(h));
    (
        (f64::from(w) * r).round() as u32,
        (f64::from(h) * r).round() as u32,
    )
}

/// Caption font size for a canvas of `display_width`.
pub fn font_size_for(display_width: u32, opts: &ComposeOpts) -> u32 {
    (display_width / opts.font_divisor.max(1)).max(opts.min_font_px)
}

/// Outline width for a caption font size.
pub fn stroke_width_for(font_size_px: u32, opts: &ComposeOpts) -> u32 {
    (font_size_px / opts.stroke_divisor.max(1)).max(opts.min_stroke_px)
}

/// Greedy word wrap.
///
/// Words are whitespace-delimited and joined by single spaces. A word that would push a non-empty
/// line past `max_width` starts a new line; a single word wider than `max_width` keeps a line to
/// itself and is never split. Blank input yields exactly one empty line.
pub fn wrap_lines(
    text: &str,
    max_width: f32,
    size_px: f32,
    measure: &mut dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if !line.is_empty() && measure.measure_text(&candidate, size_px) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Compute the full caption layout for a source of `source` pixels.
pub fn plan_layout(
    source: (u32, u32),
    captions: &Captions,
    opts: &ComposeOpts,
    measure: &mut dyn TextMeasure,
) -> RenderPlan {
    let (display_width, display_height) = scale_size(source.0, source.1, opts.max_display_size);
    let font_size_px = font_size_for(display_width, opts);
    let line_height_px = f64::from(font_size_px) * opts.line_height_factor;
    let padding = f64::from(opts.padding);
    let max_text_width = display_width as f32 - 2.0 * opts.padding as f32;
    let size = font_size_px as f32;

    let top_lines = wrap_lines(&captions.top, max_text_width, size, measure);
    let bottom_lines = wrap_lines(&captions.bottom, max_text_width, size, measure);

    let top = TextBlock {
        lines: top_lines,
        y_start: padding,
        line_height: line_height_px,
    };
    let bottom_y = f64::from(display_height) - padding - bottom_lines.len() as f64 * line_height_px;
    let bottom = TextBlock {
        lines: bottom_lines,
        y_start: bottom_y,
        line_height: line_height_px,
    };

    RenderPlan {
        display_width,
        display_height,
        font_size_px,
        line_height_px,
        stroke_width_px: stroke_width_for(font_size_px, opts),
        top,
        bottom,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layout.rs"]
mod tests;
