use crate::effects::composite::{blend_row, unpremultiply};
use crate::foundation::core::{PxRect, Size};
use crate::foundation::error::{StageError, StageResult};

/// A CPU pixel surface holding **premultiplied** RGBA8, row-major, tightly packed.
///
/// This is the only drawing primitive the compositing core relies on: create an empty surface,
/// blit a (scaled) region of one surface into another, and read the raw buffer back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Per-blit drawing options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlitOpts {
    /// Global opacity applied to the source, clamped to `[0, 1]`.
    pub opacity: f32,
    /// Optional clip rectangle in destination coordinates.
    pub clip: Option<PxRect>,
}

impl Default for BlitOpts {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            clip: None,
        }
    }
}

impl Surface {
    /// Create a fully transparent surface. Zero-sized surfaces are allowed and empty.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; byte_len(width, height)],
        }
    }

    /// Wrap an existing premultiplied RGBA8 buffer.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> StageResult<Self> {
        if data.len() != byte_len(width, height) {
            return Err(StageError::validation(format!(
                "surface buffer is {} bytes, expected {}x{}x4",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap a straight-alpha RGBA8 buffer, premultiplying it in place.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> StageResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul_rgba8(width, height, data)
    }

    /// Surface filled with a single premultiplied color.
    pub fn filled(width: u32, height: u32, rgba_premul: [u8; 4]) -> Self {
        let mut s = Self::new(width, height);
        s.fill(rgba_premul);
        s
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True when the surface has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the surface and return its premultiplied bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Premultiplied pixel at `(x, y)`, `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub(crate) fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.data[self.index(x, y) + 3]
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Overwrite every pixel with `rgba_premul`.
    pub fn fill(&mut self, rgba_premul: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba_premul);
        }
    }

    /// Copy the intersection of `rect` with this surface into a new surface of that size.
    pub fn crop(&self, rect: PxRect) -> Surface {
        let Some(r) = rect.intersect(PxRect::from_size(self.size())) else {
            return Surface::new(0, 0);
        };
        let mut out = Surface::new(r.w, r.h);
        let row_bytes = r.w as usize * 4;
        for row in 0..r.h {
            let src = self.index(r.x as u32, r.y as u32 + row);
            let dst = out.index(0, row);
            out.data[dst..dst + row_bytes].copy_from_slice(&self.data[src..src + row_bytes]);
        }
        out
    }

    /// Resample to `width x height` with a triangle filter. Same-size requests return a copy.
    pub fn resized(&self, width: u32, height: u32) -> Surface {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if width == 0 || height == 0 || self.is_empty() {
            return Surface::new(width, height);
        }
        // Premultiplied data filters without color fringes at alpha edges.
        let Some(src) = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
        else {
            return Surface::new(width, height);
        };
        let out = image::imageops::resize(&src, width, height, image::imageops::FilterType::Triangle);
        Surface {
            width,
            height,
            data: out.into_raw(),
        }
    }

    /// Composite `src_rect` of `src`, scaled to `dst`, over this surface.
    pub fn blit(&mut self, src: &Surface, src_rect: PxRect, dst: PxRect, opts: BlitOpts) {
        if dst.is_empty() || src_rect.is_empty() || src.is_empty() {
            return;
        }
        let region = if src_rect == PxRect::from_size(src.size()) {
            std::borrow::Cow::Borrowed(src)
        } else {
            std::borrow::Cow::Owned(src.crop(src_rect))
        };
        if region.is_empty() {
            return;
        }
        let scaled = if region.size() == Size::new(dst.w, dst.h) {
            region
        } else {
            std::borrow::Cow::Owned(region.resized(dst.w, dst.h))
        };
        self.composite_unscaled(&scaled, dst.x, dst.y, opts);
    }

    /// Composite all of `src`, scaled to `dst`, over this surface.
    pub fn draw_scaled(&mut self, src: &Surface, dst: PxRect, opts: BlitOpts) {
        self.blit(src, PxRect::from_size(src.size()), dst, opts);
    }

    fn composite_unscaled(&mut self, src: &Surface, x: i32, y: i32, opts: BlitOpts) {
        let target = PxRect::new(x, y, src.width, src.height);
        let mut visible = target.intersect(PxRect::from_size(self.size()));
        if let Some(clip) = opts.clip {
            visible = visible.and_then(|v| v.intersect(clip));
        }
        let Some(v) = visible else {
            return;
        };

        let row_bytes = v.w as usize * 4;
        for row in 0..v.h {
            let dy = v.y as u32 + row;
            let sy = (i64::from(dy) - i64::from(y)) as u32;
            let sx = (i64::from(v.x) - i64::from(x)) as u32;
            let si = src.index(sx, sy);
            let di = self.index(v.x as u32, dy);
            blend_row(
                &mut self.data[di..di + row_bytes],
                &src.data[si..si + row_bytes],
                opts.opacity,
            );
        }
    }

    /// Straight-alpha RGBA8 copy of the surface, as expected by image encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&unpremultiply([px[0], px[1], px[2], px[3]]));
        }
        out
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((u16::from(px[0]) * a + 127) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a + 127) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
