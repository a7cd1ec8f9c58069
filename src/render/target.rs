use crate::assets::decode::Bitmap;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::MemeResult;

/// A rendered surface as RGBA8 pixels.
///
/// The `premultiplied` flag makes the alpha convention explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// `true` when the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Text measurement capability used by layout.
pub trait TextMeasure {
    /// Rendered advance width of `text` at `size_px`, in pixels.
    fn measure_text(&mut self, text: &str, size_px: f32) -> f32;
}

/// Drawing surface consumed by the compositor.
///
/// Operations apply in call order, so a later draw covers an earlier one. Text is anchored at its
/// horizontal center and its top edge.
pub trait RenderTarget: TextMeasure {
    /// Current surface size in pixels (`(0, 0)` before the first resize).
    fn size(&self) -> (u32, u32);

    /// Resize the surface and clear it to transparent.
    fn resize(&mut self, width: u32, height: u32) -> MemeResult<()>;

    /// Draw `bitmap` stretched to `width x height` with its top-left corner at the origin.
    fn draw_image(&mut self, bitmap: &Bitmap, width: u32, height: u32) -> MemeResult<()>;

    /// Cover the whole surface with `color`.
    fn fill(&mut self, color: Rgba8) -> MemeResult<()>;

    /// Outline the glyphs of `text`.
    fn stroke_text(
        &mut self,
        text: &str,
        anchor: Point,
        size_px: f32,
        color: Rgba8,
        stroke_width: f32,
    ) -> MemeResult<()>;

    /// Fill the glyphs of `text`.
    fn fill_text(&mut self, text: &str, anchor: Point, size_px: f32, color: Rgba8)
    -> MemeResult<()>;

    /// Read back the current surface contents.
    fn snapshot(&mut self) -> MemeResult<FrameRGBA>;
}
