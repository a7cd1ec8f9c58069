use std::sync::Arc;

use crate::assets::decode::Bitmap;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::target::{FrameRGBA, RenderTarget, TextMeasure};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Brush type carried through Parley layouts. Colors are applied at draw time.
struct TextBrush;

#[derive(Clone)]
struct ImagePaint {
    source: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

/// Parley contexts plus the single registered caption font.
struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
}

impl TextLayoutEngine {
    fn new(font_bytes: &[u8]) -> MemeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| MemeError::validation("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MemeError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Shape `text` on a single unbroken line.
    fn layout_line(&mut self, text: &str, size_px: f32) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::BOLD,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

/// CPU [`RenderTarget`] powered by `vello_cpu`, with text shaped by Parley.
///
/// Draw calls are recorded into a `vello_cpu` context and rasterized on [`RenderTarget::snapshot`].
/// Surface sides are limited to `u16::MAX` pixels.
pub struct CpuTarget {
    width: u16,
    height: u16,
    ctx: Option<vello_cpu::RenderContext>,
    font: vello_cpu::peniko::FontData,
    text_engine: TextLayoutEngine,
    image_cache: Option<ImagePaint>,
}

impl CpuTarget {
    /// Create a zero-sized target that draws captions with the given TrueType/OpenType font.
    pub fn new(font_bytes: Vec<u8>) -> MemeResult<Self> {
        let text_engine = TextLayoutEngine::new(&font_bytes)?;
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        Ok(Self {
            width: 0,
            height: 0,
            ctx: None,
            font,
            text_engine,
            image_cache: None,
        })
    }

    /// Load the font from a file.
    pub fn from_font_path(path: impl AsRef<std::path::Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            MemeError::validation(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::new(bytes)
    }


    fn image_paint_for(&mut self, bitmap: &Bitmap) -> MemeResult<vello_cpu::Image> {
        if let Some(p) = &self.image_cache
            && Arc::ptr_eq(&p.source, &bitmap.rgba8_premul)
        {
            return Ok(p.paint.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&bitmap.rgba8_premul, bitmap.width, bitmap.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache = Some(ImagePaint {
            source: bitmap.rgba8_premul.clone(),
            paint: paint.clone(),
        });
        Ok(paint)
    }

    /// Emit one glyph run per shaped run, centered on `anchor.x` with its top at `anchor.y`.
    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        size_px: f32,
        color: Rgba8,
        stroke_width: Option<f32>,
    ) -> MemeResult<()> {
        if self.ctx.is_none() {
            return Ok(());
        }
        let layout = self.text_engine.layout_line(text, size_px);
        let x0 = anchor.x - f64::from(layout.full_width()) / 2.0;
        let font = self.font.clone();
        let Some(ctx) = self.ctx.as_mut() else {
            return Ok(());
        };

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x0, anchor.y)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        if let Some(w) = stroke_width {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(w)));
        }
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                let builder = ctx.glyph_run(&font).font_size(run.run().font_size());
                match stroke_width {
                    Some(_) => builder.stroke_glyphs(glyphs),
                    None => builder.fill_glyphs(glyphs),
                }
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

impl TextMeasure for CpuTarget {
    fn measure_text(&mut self, text: &str, size_px: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.text_engine.layout_line(text, size_px).full_width()
    }
}

impl RenderTarget for CpuTarget {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn resize(&mut self, width: u32, height: u32) -> MemeResult<()> {
        let w: u16 = width
            .try_into()
            .map_err(|_| MemeError::render("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| MemeError::render("surface height exceeds u16"))?;

        self.ctx = match self.ctx.take() {
            _ if w == 0 || h == 0 => None,
            Some(mut ctx) if ctx.width() == w && ctx.height() == h => {
                ctx.reset();
                Some(ctx)
            }
            _ => Some(vello_cpu::RenderContext::new(w, h)),
        };
        self.width = w;
        self.height = h;
        Ok(())
    }

    fn draw_image(&mut self, bitmap: &Bitmap, width: u32, height: u32) -> MemeResult<()> {
        if self.ctx.is_none() {
            return Ok(());
        }
        let paint = self.image_paint_for(bitmap)?;
        let sx = f64::from(width) / f64::from(bitmap.width);
        let sy = f64::from(height) / f64::from(bitmap.height);
        let Some(ctx) = self.ctx.as_mut() else {
            return Ok(());
        };

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(bitmap.width),
            f64::from(bitmap.height),
        ));
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn fill(&mut self, color: Rgba8) -> MemeResult<()> {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let Some(ctx) = self.ctx.as_mut() else {
            return Ok(());
        };
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
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
        if text.is_empty() {
            return Ok(());
        }
        self.draw_text(text, anchor, size_px, color, Some(stroke_width))
    }

    fn fill_text(
        &mut self,
        text: &str,
        anchor: Point,
        size_px: f32,
        color: Rgba8,
    ) -> MemeResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.draw_text(text, anchor, size_px, color, None)
    }

    fn snapshot(&mut self) -> MemeResult<FrameRGBA> {
        let (w, h) = (self.width, self.height);
        let Some(ctx) = self.ctx.as_mut() else {
            return Ok(FrameRGBA {
                width: 0,
                height: 0,
                data: Vec::new(),
                premultiplied: true,
            });
        };
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> MemeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MemeError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MemeError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(MemeError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; bitmap bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
