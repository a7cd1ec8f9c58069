use crate::assets::decode::Bitmap;
use crate::compose::layout::{ComposeOpts, RenderPlan, TextBlock, plan_layout};
use crate::foundation::core::{Captions, Point};
use crate::foundation::error::MemeResult;
use crate::render::target::RenderTarget;

/// Draws a bitmap plus top/bottom captions onto a [`RenderTarget`].
///
/// Rendering is synchronous and deterministic for a given target: the target is resized to the
/// display size, the image is drawn at the origin, then every caption line is stroked and filled
/// at the same anchor.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    opts: ComposeOpts,
}

impl Compositor {
    /// Compositor with custom options.
    pub fn new(opts: ComposeOpts) -> Self {
        Self { opts }
    }

    /// Active options.
    pub fn opts(&self) -> &ComposeOpts {
        &self.opts
    }

    /// Render using the bitmap's own dimensions as the source size.
    pub fn render(
        &self,
        target: &mut dyn RenderTarget,
        bitmap: &Bitmap,
        captions: &Captions,
    ) -> MemeResult<RenderPlan> {
        self.render_sized(target, bitmap, bitmap.dimensions(), captions)
    }

    /// Render using declared source dimensions (e.g. a template's listed size). The bitmap is
    /// stretched to the scaled declared size.
    pub fn render_sized(
        &self,
        target: &mut dyn RenderTarget,
        bitmap: &Bitmap,
        source: (u32, u32),
        captions: &Captions,
    ) -> MemeResult<RenderPlan> {
        let plan = plan_layout(source, captions, &self.opts, &mut *target);

        target.resize(plan.display_width, plan.display_height)?;
        target.draw_image(bitmap, plan.display_width, plan.display_height)?;
        self.draw_block(target, &plan, &plan.top)?;
        self.draw_block(target, &plan, &plan.bottom)?;
        Ok(plan)
    }

    /// Replace the surface contents with the failure notice, keeping its size.
    ///
    /// Returns `false` (and draws nothing) when the target has never been sized.
    pub fn render_failure(&self, target: &mut dyn RenderTarget) -> MemeResult<bool> {
        let (w, h) = target.size();
        if w == 0 || h == 0 {
            return Ok(false);
        }
        let size = self.opts.failure_font_px;
        let anchor = Point::new(
            f64::from(w) / 2.0,
            (f64::from(h) - f64::from(size)) / 2.0,
        );

        target.resize(w, h)?;
        target.fill(self.opts.failure_background)?;
        target.fill_text(&self.opts.failure_message, anchor, size, self.opts.text_color)?;
        Ok(true)
    }

    fn draw_block(
        &self,
        target: &mut dyn RenderTarget,
        plan: &RenderPlan,
        block: &TextBlock,
    ) -> MemeResult<()> {
        let size = plan.font_size_px as f32;
        let stroke = plan.stroke_width_px as f32;
        for (line, y) in block.placed() {
            let anchor = plan.anchor(y);
            target.stroke_text(line, anchor, size, self.opts.outline_color, stroke)?;
            target.fill_text(line, anchor, size, self.opts.text_color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
