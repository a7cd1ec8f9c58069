use crate::assets::decode::Bitmap;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::target::{FrameRGBA, RenderTarget, TextMeasure};

/// Advance of one glyph relative to the font size.
pub const DEFAULT_ADVANCE_RATIO: f32 = 0.6;

/// One recorded call on a [`RecordingTarget`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// `resize(width, height)`.
    Resize {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// `draw_image(bitmap, width, height)`.
    Image {
        /// Source bitmap size.
        source: (u32, u32),
        /// Destination width.
        width: u32,
        /// Destination height.
        height: u32,
    },
    /// `fill(color)`.
    Fill(Rgba8),
    /// `stroke_text(..)`.
    StrokeText {
        /// Drawn text.
        text: String,
        /// Center-top anchor.
        anchor: Point,
        /// Font size.
        size_px: f32,
        /// Outline color.
        color: Rgba8,
        /// Outline width.
        stroke_width: f32,
    },
    /// `fill_text(..)`.
    FillText {
        /// Drawn text.
        text: String,
        /// Center-top anchor.
        anchor: Point,
        /// Font size.
        size_px: f32,
        /// Fill color.
        color: Rgba8,
    },
}

/// Headless [`RenderTarget`] that records every call.
///
/// Text is measured as `chars x size_px x advance_ratio`, which makes layout deterministic without
/// fonts. Snapshots rasterize fills and images (nearest neighbour) and skip text.
#[derive(Clone, Debug)]
pub struct RecordingTarget {
    advance_ratio: f32,
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
    pixels: Vec<u8>,
}

impl Default for RecordingTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTarget {
    /// Target with [`DEFAULT_ADVANCE_RATIO`].
    pub fn new() -> Self {
        Self::with_advance_ratio(DEFAULT_ADVANCE_RATIO)
    }

    /// Target with a custom per-glyph advance ratio.
    pub fn with_advance_ratio(advance_ratio: f32) -> Self {
        Self {
            advance_ratio,
            width: 0,
            height: 0,
            ops: Vec::new(),
            pixels: Vec::new(),
        }
    }

    /// Recorded operations since construction or the last [`RecordingTarget::clear_ops`].
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Forget recorded operations (pixels are kept).
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Text of every `FillText` op, in draw order.
    pub fn filled_text(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for RecordingTarget {
    fn measure_text(&mut self, text: &str, size_px: f32) -> f32 {
        text.chars().count() as f32 * size_px * self.advance_ratio
    }
}

impl RenderTarget for RecordingTarget {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> MemeResult<()> {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
        self.ops.push(DrawOp::Resize { width, height });
        Ok(())
    }

    fn draw_image(&mut self, bitmap: &Bitmap, width: u32, height: u32) -> MemeResult<()> {
        let w = width.min(self.width);
        let h = height.min(self.height);
        for y in 0..h {
            let sy = (u64::from(y) * u64::from(bitmap.height) / u64::from(height)) as usize;
            for x in 0..w {
                let sx = (u64::from(x) * u64::from(bitmap.width) / u64::from(width)) as usize;
                let src = (sy * bitmap.width as usize + sx) * 4;
                let dst = ((y * self.width + x) as usize) * 4;
                self.pixels[dst..dst + 4].copy_from_slice(&bitmap.rgba8_premul[src..src + 4]);
            }
        }
        self.ops.push(DrawOp::Image {
            source: bitmap.dimensions(),
            width,
            height,
        });
        Ok(())
    }

    fn fill(&mut self, color: Rgba8) -> MemeResult<()> {
        let px = color.to_premul_array();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        self.ops.push(DrawOp::Fill(color));
        Ok(())
    }

    fn stroke_text(
        &mut self,
        text: &str,
        anchor: Point,
        size_px: f32,
        color: Rgba8,
        stroke_width: f32,
    ) -> MemeResult<()> {
        self.ops.push(DrawOp::StrokeText {
            text: text.to_string(),
            anchor,
            size_px,
            color,
            stroke_width,
        });
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        anchor: Point,
        size_px: f32,
        color: Rgba8,
    ) -> MemeResult<()> {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            anchor,
            size_px,
            color,
        });
        Ok(())
    }

    fn snapshot(&mut self) -> MemeResult<FrameRGBA> {
        if self.pixels.len() != (self.width as usize) * (self.height as usize) * 4 {
            return Err(MemeError::render("recording surface out of sync"));
        }
        Ok(FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.pixels.clone(),
            premultiplied: true,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
