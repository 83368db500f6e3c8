use crate::foundation::core::{PxRect, Size};
use crate::render::surface::Surface;

/// Pixels whose alpha is strictly greater than this are considered opaque by default.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 1;

/// Tight opaque bounding box of an image plus the cropped pixels.
///
/// A zero-area result (no pixel above the threshold) is a valid, non-drawable state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrimResult {
    /// Left edge of the box in source pixels.
    pub left: u32,
    /// Top edge of the box in source pixels.
    pub top: u32,
    /// Box width; 0 when the source has no opaque pixels.
    pub width: u32,
    /// Box height; 0 when the source has no opaque pixels.
    pub height: u32,
    surface: Surface,
}

impl TrimResult {
    fn empty() -> Self {
        Self {
            left: 0,
            top: 0,
            width: 0,
            height: 0,
            surface: Surface::new(0, 0),
        }
    }

    /// The cropped surface, sized exactly `width x height`.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Trimmed size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounding box in source coordinates.
    pub fn bounds(&self) -> PxRect {
        PxRect::new(self.left as i32, self.top as i32, self.width, self.height)
    }

    /// True when nothing survived the trim.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Inverse of [`TrimResult::is_empty`]; consumers skip non-drawable results.
    pub fn is_drawable(&self) -> bool {
        !self.is_empty()
    }
}

/// Crop `src` to the minimal box containing every pixel with alpha `> alpha_threshold`.
///
/// Edges close in from the top, bottom, left, then right; the column scans are bounded by the
/// row range already found.
pub fn trim_surface(src: &Surface, alpha_threshold: u8) -> TrimResult {
    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    let opaque = |x: i64, y: i64| src.alpha_at(x as u32, y as u32) > alpha_threshold;

    let mut top = 0i64;
    while top < h && !(0..w).any(|x| opaque(x, top)) {
        top += 1;
    }
    let mut bottom = h - 1;
    while bottom >= top && !(0..w).any(|x| opaque(x, bottom)) {
        bottom -= 1;
    }
    let mut left = 0i64;
    while left < w && !(top..=bottom).any(|y| opaque(left, y)) {
        left += 1;
    }
    let mut right = w - 1;
    while right >= left && !(top..=bottom).any(|y| opaque(right, y)) {
        right -= 1;
    }

    let tw = (right - left + 1).max(0);
    let th = (bottom - top + 1).max(0);
    if tw == 0 || th == 0 {
        return TrimResult::empty();
    }

    let bounds = PxRect::new(left as i32, top as i32, tw as u32, th as u32);
    TrimResult {
        left: left as u32,
        top: top as u32,
        width: tw as u32,
        height: th as u32,
        surface: src.crop(bounds),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/trim.rs"]
mod tests;
