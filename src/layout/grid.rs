use crate::assets::bundle::ItemId;
use crate::foundation::core::{PxRect, Size};

/// One layout input: an item and the sizes it may be fitted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutItem {
    /// Bundle item.
    pub id: ItemId,
    /// Alpha-trimmed size, when a trim exists.
    pub trimmed: Option<Size>,
    /// Decoded asset size.
    pub original: Size,
}

impl LayoutItem {
    /// Size the item is fitted by: trimmed, else original, else `1x1`.
    pub fn natural_size(&self) -> Size {
        self.trimmed
            .filter(|s| !s.is_empty())
            .or(Some(self.original).filter(|s| !s.is_empty()))
            .unwrap_or(Size::new(1, 1))
    }
}

/// Where one item lands, relative to the stage area's origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Placed item.
    pub id: ItemId,
    /// Left edge within the area.
    pub x: u32,
    /// Top edge within the area.
    pub y: u32,
    /// Fitted width.
    pub w: u32,
    /// Fitted height.
    pub h: u32,
}

impl Placement {
    /// Rectangle relative to the stage area.
    pub fn rect(&self) -> PxRect {
        PxRect::new(self.x as i32, self.y as i32, self.w, self.h)
    }

    /// Rectangle in background coordinates for an area anchored at `(ox, oy)`.
    pub fn rect_at(&self, ox: u32, oy: u32) -> PxRect {
        PxRect::new(
            (ox + self.x) as i32,
            (oy + self.y) as i32,
            self.w,
            self.h,
        )
    }
}

/// Grid parameters. `columns == 0` derives the column count from the area's aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridParams {
    /// Stage area width.
    pub area_w: u32,
    /// Stage area height.
    pub area_h: u32,
    /// Requested column count, `0` for automatic.
    pub columns: u32,
    /// Gap between cells in pixels.
    pub gap: u32,
}

/// Result of [`layout_grid`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridLayout {
    /// One placement per input item, in input order.
    pub placements: Vec<Placement>,
    /// Resolved column count.
    pub columns: u32,
    /// `ceil(n / columns)`.
    pub rows: u32,
    /// Cell size after gap subtraction.
    pub cell: Size,
    /// Set when the area could not hold the requested cells and gap; the layout was
    /// clamped into the area and may overlap.
    pub degenerate: bool,
}

impl GridLayout {
    /// Placement of `id`, if it was laid out.
    pub fn get(&self, id: ItemId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// True when nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Column count for `n` items: the requested count, or `round(sqrt(n * w / h))` (at least 1).
pub fn column_count(n: usize, params: &GridParams) -> u32 {
    if params.columns > 0 {
        return params.columns;
    }
    let aspect = f64::from(params.area_w.max(1)) / f64::from(params.area_h.max(1));
    let c = (n as f64 * aspect).sqrt().round();
    (c as u32).max(1)
}

/// Place `items` row-major into a grid over the area, each scaled uniformly to fit its cell
/// and centered in it.
#[tracing::instrument(skip(items), fields(n = items.len()))]
pub fn layout_grid(items: &[LayoutItem], params: GridParams) -> GridLayout {
    if items.is_empty() {
        return GridLayout::default();
    }

    let area_w = params.area_w.max(1);
    let area_h = params.area_h.max(1);
    let mut degenerate = params.area_w == 0 || params.area_h == 0;

    let cols = column_count(items.len(), &params);
    let rows = items.len().div_ceil(cols as usize) as u32;

    let x_axis = fit_axis(area_w, cols, params.gap);
    let y_axis = fit_axis(area_h, rows, params.gap);
    degenerate |= x_axis.degenerate || y_axis.degenerate;

    let cell_w = x_axis.cell;
    let cell_h = y_axis.cell;

    let placements = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let col = (i as u32) % cols;
            let row = (i as u32) / cols;
            let nat = item.natural_size();
            let scale = (f64::from(cell_w) / f64::from(nat.width))
                .min(f64::from(cell_h) / f64::from(nat.height));
            let w = ((f64::from(nat.width) * scale).round() as u32).clamp(1, cell_w);
            let h = ((f64::from(nat.height) * scale).round() as u32).clamp(1, cell_h);

            let cell_x = u64::from(col) * (u64::from(cell_w) + u64::from(x_axis.gap));
            let cell_y = u64::from(row) * (u64::from(cell_h) + u64::from(y_axis.gap));
            let x = cell_x + u64::from((cell_w - w) / 2);
            let y = cell_y + u64::from((cell_h - h) / 2);

            Placement {
                id: item.id,
                x: x.min(u64::from(area_w.saturating_sub(w))) as u32,
                y: y.min(u64::from(area_h.saturating_sub(h))) as u32,
                w: w.min(area_w),
                h: h.min(area_h),
            }
        })
        .collect();

    if degenerate {
        tracing::warn!(
            area_w = params.area_w,
            area_h = params.area_h,
            cols,
            rows,
            gap = params.gap,
            "stage area too small for grid; cells clamped to 1px"
        );
    }

    GridLayout {
        placements,
        columns: cols,
        rows,
        cell: Size::new(cell_w, cell_h),
        degenerate,
    }
}

struct AxisFit {
    cell: u32,
    gap: u32,
    degenerate: bool,
}

// `floor((len - gap*(count-1)) / count)`; below 1px the gap shrinks first, then the cell
// clamps to 1.
fn fit_axis(len: u32, count: u32, gap: u32) -> AxisFit {
    let count = count.max(1);
    let gaps = i64::from(count - 1);
    let raw = (i64::from(len) - i64::from(gap) * gaps).div_euclid(i64::from(count));
    if raw >= 1 {
        return AxisFit {
            cell: raw as u32,
            gap,
            degenerate: false,
        };
    }
    let gap = if gaps > 0 {
        ((i64::from(len) - i64::from(count)) / gaps).max(0) as u32
    } else {
        0
    };
    let cell = ((i64::from(len) - i64::from(gap) * gaps) / i64::from(count)).max(1) as u32;
    AxisFit {
        cell,
        gap,
        degenerate: true,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
