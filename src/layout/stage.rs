use crate::foundation::core::{PxRect, Size};

/// Smallest width/height the stage area may be dragged to.
pub const MIN_STAGE_SIDE: u32 = 20;

/// Distance (in background pixels) within which a pointer grabs a corner handle.
pub const HANDLE_MARGIN: f64 = 10.0;

/// Corner handle of the stage area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    /// Top-left.
    Nw,
    /// Top-right.
    Ne,
    /// Bottom-left.
    Sw,
    /// Bottom-right.
    Se,
}

impl Corner {
    fn moves_left_edge(self) -> bool {
        matches!(self, Corner::Nw | Corner::Sw)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, Corner::Nw | Corner::Ne)
    }
}

/// What a pointer press on the background grabbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragHandle {
    /// Inside the area: drag moves it.
    Move,
    /// Near a corner: drag resizes from it.
    Resize(Corner),
}

/// The rectangle, in background pixels, the grid is composited into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StageArea {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width, at least [`MIN_STAGE_SIDE`] once clamped.
    pub w: u32,
    /// Height, at least [`MIN_STAGE_SIDE`] once clamped.
    pub h: u32,
}

impl StageArea {
    /// Build an area without clamping.
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Centered area covering 70% of the background's width and 50% of its height.
    pub fn default_for(bg: Size) -> Self {
        let w = (f64::from(bg.width) * 0.7).round();
        let h = (f64::from(bg.height) * 0.5).round();
        let x = ((f64::from(bg.width) - w) / 2.0).round();
        let y = ((f64::from(bg.height) - h) / 2.0).round();
        Self::new(x as u32, y as u32, w as u32, h as u32)
    }

    /// Width and height.
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Area as a pixel rectangle on the background.
    pub fn rect(&self) -> PxRect {
        PxRect::new(self.x as i32, self.y as i32, self.w, self.h)
    }

    /// Bring an arbitrary float box back inside `bg`: origin within `[0, bg - 20]`, sides within
    /// `[20, bg - origin]`. Backgrounds smaller than the minimum side still get a 20px area.
    pub fn clamped(x: f64, y: f64, w: f64, h: f64, bg: Size) -> Self {
        let bw = f64::from(bg.width);
        let bh = f64::from(bg.height);
        let min = f64::from(MIN_STAGE_SIDE);
        let x = x.min(bw - min).max(0.0);
        let y = y.min(bh - min).max(0.0);
        let w = w.min(bw - x).max(min);
        let h = h.min(bh - y).max(min);
        Self::new(
            x.round() as u32,
            y.round() as u32,
            w.round() as u32,
            h.round() as u32,
        )
    }

    /// This area clamped into `bg`.
    pub fn clamp_to(&self, bg: Size) -> Self {
        Self::clamped(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.w),
            f64::from(self.h),
            bg,
        )
    }

    /// Move by `(dx, dy)`, keeping the size where the background allows.
    pub fn translate(&self, dx: f64, dy: f64, bg: Size) -> Self {
        Self::clamped(
            f64::from(self.x) + dx,
            f64::from(self.y) + dy,
            f64::from(self.w),
            f64::from(self.h),
            bg,
        )
    }

    /// Drag `corner` by `(dx, dy)`; the opposite corner stays put until clamping kicks in.
    pub fn resize(&self, corner: Corner, dx: f64, dy: f64, bg: Size) -> Self {
        let (mut x, mut y) = (f64::from(self.x), f64::from(self.y));
        let (mut w, mut h) = (f64::from(self.w), f64::from(self.h));
        if corner.moves_left_edge() {
            x += dx;
            w -= dx;
        } else {
            w += dx;
        }
        if corner.moves_top_edge() {
            y += dy;
            h -= dy;
        } else {
            h += dy;
        }
        Self::clamped(x, y, w, h, bg)
    }

    /// Apply a drag that started on `handle`.
    pub fn drag(&self, handle: DragHandle, dx: f64, dy: f64, bg: Size) -> Self {
        match handle {
            DragHandle::Move => self.translate(dx, dy, bg),
            DragHandle::Resize(corner) => self.resize(corner, dx, dy, bg),
        }
    }

    /// Which handle a press at `(px, py)` grabs. Corners win over the interior.
    pub fn hit_test(&self, px: f64, py: f64) -> Option<DragHandle> {
        let (x0, y0) = (f64::from(self.x), f64::from(self.y));
        let (x1, y1) = (x0 + f64::from(self.w), y0 + f64::from(self.h));
        let corners = [
            (Corner::Nw, x0, y0),
            (Corner::Ne, x1, y0),
            (Corner::Sw, x0, y1),
            (Corner::Se, x1, y1),
        ];
        for (corner, cx, cy) in corners {
            if (px - cx).abs() <= HANDLE_MARGIN && (py - cy).abs() <= HANDLE_MARGIN {
                return Some(DragHandle::Resize(corner));
            }
        }
        (px >= x0 && py >= y0 && px <= x1 && py <= y1).then_some(DragHandle::Move)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/stage.rs"]
mod tests;
