use std::io::Cursor;
use std::path::Path;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::core::Template;
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::target::FrameRGBA;

/// An encoded meme ready to be saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    /// Suggested artifact name (`meme-<id>.png`).
    pub file_name: String,
    /// PNG bytes.
    pub png: Vec<u8>,
}

impl Export {
    /// Write the PNG to `path`, creating parent directories as needed.
    pub fn write_to(&self, path: &Path) -> MemeResult<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, &self.png)
            .map_err(|e| MemeError::export(format!("write '{}': {e}", path.display())))
    }
}

/// Artifact name for a template export.
pub fn export_file_name(template: &Template) -> String {
    format!("meme-{}.png", template.id)
}

/// Encode a frame as PNG.
///
/// Zero-area frames and frames whose byte length disagrees with their size are rejected.
pub fn export_png(frame: &FrameRGBA) -> MemeResult<Vec<u8>> {
    if frame.is_empty() {
        return Err(MemeError::export(format!(
            "cannot export a {}x{} surface",
            frame.width, frame.height
        )));
    }
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.data.len() != expected {
        return Err(MemeError::export(format!(
            "frame {}x{} expects {expected} bytes, got {}",
            frame.width,
            frame.height,
            frame.data.len()
        )));
    }

    // PNG stores straight alpha.
    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| MemeError::export("frame buffer does not fit its dimensions"))?;

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| MemeError::export(format!("png encode: {e}")))?;
    Ok(out.into_inner())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MemeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
