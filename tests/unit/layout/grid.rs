use super::*;

fn item(id: u64, w: u32, h: u32) -> LayoutItem {
    LayoutItem {
        id: ItemId(id),
        trimmed: Some(Size::new(w, h)),
        original: Size::new(w, h),
    }
}

fn params(area_w: u32, area_h: u32, columns: u32, gap: u32) -> GridParams {
    GridParams {
        area_w,
        area_h,
        columns,
        gap,
    }
}

fn overlaps(a: &Placement, b: &Placement) -> bool {
    a.rect().intersect(b.rect()).is_some()
}

#[test]
fn two_squares_in_wide_area_use_two_columns() {
    let items = [item(1, 100, 100), item(2, 100, 100)];
    let g = layout_grid(&items, params(400, 300, 0, 10));
    assert_eq!(g.columns, 2);
    assert_eq!(g.rows, 1);
    assert_eq!(g.cell, Size::new(195, 300));
    assert!(!g.degenerate);
    assert_eq!(
        g.placements,
        vec![
            Placement {
                id: ItemId(1),
                x: 0,
                y: 52,
                w: 195,
                h: 195
            },
            Placement {
                id: ItemId(2),
                x: 205,
                y: 52,
                w: 195,
                h: 195
            },
        ]
    );
    assert!(!overlaps(&g.placements[0], &g.placements[1]));
}

#[test]
fn explicit_columns_win_over_auto() {
    let items: Vec<_> = (0..6).map(|i| item(i, 10, 10)).collect();
    let g = layout_grid(&items, params(300, 300, 3, 0));
    assert_eq!((g.columns, g.rows), (3, 2));
    assert_eq!(g.cell, Size::new(100, 150));
    // 10x10 scales to 100x100 and is centred in the 150px-tall cell.
    assert_eq!(g.placements[4].w, 100);
    assert_eq!(g.placements[4].h, 100);
    assert_eq!(g.placements[4].x, 100);
    assert_eq!(g.placements[4].y, 175);
}

#[test]
fn auto_columns_follow_area_aspect() {
    assert_eq!(column_count(4, &params(200, 200, 0, 0)), 2);
    assert_eq!(column_count(1, &params(100, 1000, 0, 0)), 1);
    assert_eq!(column_count(3, &params(900, 100, 0, 0)), 5);
}

#[test]
fn placements_stay_inside_area() {
    let sizes = [(640, 480), (30, 500), (500, 30), (1, 1), (77, 13)];
    for n in 1..=12u64 {
        for &(aw, ah) in &[(50u32, 50u32), (51, 300), (400, 300), (1000, 57)] {
            for gap in [0u32, 3, 8, 25] {
                let items: Vec<_> = (0..n)
                    .map(|i| {
                        let (w, h) = sizes[i as usize % sizes.len()];
                        item(i, w, h)
                    })
                    .collect();
                let g = layout_grid(&items, params(aw, ah, 0, gap));
                assert_eq!(g.placements.len(), n as usize);
                for p in &g.placements {
                    assert!(p.w >= 1 && p.h >= 1);
                    assert!(p.x + p.w <= aw, "{p:?} in {aw}x{ah} gap {gap}");
                    assert!(p.y + p.h <= ah, "{p:?} in {aw}x{ah} gap {gap}");
                }
            }
        }
    }
}

#[test]
fn aspect_ratio_is_preserved_within_rounding() {
    let items = [item(1, 640, 480), item(2, 90, 300), item(3, 500, 120)];
    let g = layout_grid(&items, params(600, 400, 0, 8));
    for (p, it) in g.placements.iter().zip(&items) {
        let nat = it.natural_size();
        let want = f64::from(nat.width) / f64::from(nat.height);
        // One pixel of rounding on either side bounds the ratio error.
        let lo = (f64::from(p.w) - 0.5) / (f64::from(p.h) + 0.5);
        let hi = (f64::from(p.w) + 0.5) / (f64::from(p.h) - 0.5);
        assert!(lo <= want && want <= hi, "{p:?} vs {want}");
    }
}

#[test]
fn untrimmed_items_fall_back_to_original_then_unit() {
    let a = LayoutItem {
        id: ItemId(1),
        trimmed: None,
        original: Size::new(40, 20),
    };
    let b = LayoutItem {
        id: ItemId(2),
        trimmed: Some(Size::new(0, 0)),
        original: Size::new(0, 5),
    };
    assert_eq!(a.natural_size(), Size::new(40, 20));
    assert_eq!(b.natural_size(), Size::new(1, 1));
}

#[test]
fn empty_input_yields_empty_layout() {
    let g = layout_grid(&[], params(100, 100, 0, 8));
    assert!(g.is_empty());
    assert!(!g.degenerate);
    assert_eq!(g.cell, Size::default());
    assert_eq!(g, GridLayout::default());
}

#[test]
fn oversized_gap_is_flagged_and_clamped() {
    let items: Vec<_> = (0..4).map(|i| item(i, 10, 10)).collect();
    let g = layout_grid(&items, params(20, 20, 4, 50));
    assert!(g.degenerate);
    assert!(g.cell.width >= 1 && g.cell.height >= 1);
    for p in &g.placements {
        assert!(p.x + p.w <= 20 && p.y + p.h <= 20);
    }
}

#[test]
fn more_columns_than_pixels_still_lays_out() {
    let items: Vec<_> = (0..10).map(|i| item(i, 3, 3)).collect();
    let g = layout_grid(&items, params(4, 4, 10, 0));
    assert!(g.degenerate);
    assert_eq!(g.cell, Size::new(1, 4));
    assert!(g.placements.iter().all(|p| p.w == 1 && p.h == 1 && p.x <= 3));
}

#[test]
fn lookup_by_id() {
    let items = [item(7, 10, 10)];
    let g = layout_grid(&items, params(50, 50, 0, 0));
    assert_eq!(g.get(ItemId(7)).map(|p| p.w), Some(50));
    assert!(g.get(ItemId(8)).is_none());
}
