use crate::foundation::error::{MemeError, MemeResult};

pub use kurbo::{Point, Size};

/// A selectable base image with known dimensions.
///
/// Identity is [`Template::id`]; two templates with the same id are the same template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// Stable identifier from the listing API.
    pub id: String,
    /// Canonical image URL.
    pub url: String,
    /// Display name.
    pub name: String,
    /// Declared width in pixels, non-zero.
    pub width: u32,
    /// Declared height in pixels, non-zero.
    pub height: u32,
}

impl Template {
    /// Create a validated template (`width > 0`, `height > 0`).
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> MemeResult<Self> {
        if width == 0 || height == 0 {
            return Err(MemeError::validation(
                "template width and height must be > 0",
            ));
        }
        Ok(Self {
            id: id.into(),
            url: url.into(),
            name: name.into(),
            width,
            height,
        })
    }

    /// Declared `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Top and bottom caption strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Captions {
    /// Text anchored to the top edge.
    pub top: String,
    /// Text anchored to the bottom edge.
    pub bottom: String,
}

impl Captions {
    /// Build captions from any string-like pair.
    pub fn new(top: impl Into<String>, bottom: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            bottom: bottom.into(),
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Build an opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert into premultiplied RGBA8 bytes.
    pub fn to_premul_array(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
