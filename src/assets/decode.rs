use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Size;
use crate::foundation::error::{StageError, StageResult};
use crate::render::surface::Surface;

/// An immutable decoded bitmap plus its display name.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    name: String,
    surface: Arc<Surface>,
}

impl ImageAsset {
    /// Wrap an already decoded surface.
    pub fn new(name: impl Into<String>, surface: Surface) -> Self {
        Self {
            name: name.into(),
            surface: Arc::new(surface),
        }
    }

    /// Decode encoded image bytes (PNG, JPEG, ...).
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> StageResult<Self> {
        let name = name.into();
        let surface = decode_image(bytes)
            .map_err(|e| StageError::decode(format!("'{name}': {e}")))?;
        Ok(Self::new(name, surface))
    }

    /// Display name (usually the source file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded pixels (premultiplied RGBA8).
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Shared handle to the decoded pixels.
    pub fn shared_surface(&self) -> Arc<Surface> {
        Arc::clone(&self.surface)
    }

    /// Natural size in pixels.
    pub fn size(&self) -> Size {
        self.surface.size()
    }
}

/// Decode image bytes into a premultiplied surface.
pub fn decode_image(bytes: &[u8]) -> StageResult<Surface> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| StageError::decode(e.to_string()))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Surface::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Encode a surface as a straight-alpha PNG.
pub fn encode_png(surface: &Surface) -> StageResult<Vec<u8>> {
    if surface.is_empty() {
        return Err(StageError::encode("cannot encode an empty surface as png"));
    }
    let img = image::RgbaImage::from_raw(
        surface.width(),
        surface.height(),
        surface.to_straight_rgba8(),
    )
    .ok_or_else(|| StageError::encode("png buffer does not match surface size"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
