use super::*;
use crate::encode::sink::InMemorySink;
use crate::export::writer::MemoryWriter;
use crate::foundation::core::PxRect;
use crate::render::surface::BlitOpts;

const OPAQUE: [u8; 4] = [200, 40, 40, 255];

fn solid(w: u32, h: u32) -> Surface {
    Surface::filled(w, h, OPAQUE)
}

// `w x h` transparent canvas with an opaque `iw x ih` block at `(x, y)`.
fn padded(w: u32, h: u32, x: i32, y: i32, iw: u32, ih: u32) -> Surface {
    let mut s = Surface::new(w, h);
    s.draw_scaled(&solid(iw, ih), PxRect::new(x, y, iw, ih), BlitOpts::default());
    s
}

fn studio_with_bg() -> Studio {
    let mut studio = Studio::new(StudioSettings::default()).unwrap();
    studio.set_background(ImageAsset::new("bg.png", Surface::filled(800, 600, [0, 0, 0, 255])));
    studio
}

#[test]
fn defaults_match_the_editor() {
    let s = StudioSettings::default();
    assert_eq!((s.columns, s.gap, s.per_item_ms, s.gap_ms, s.fps), (0, 8, 800, 150, 30));
    assert_eq!(s.transition, Transition::Fade);
    assert!(s.export_singles);
    assert_eq!(s.timing().unwrap(), RevealTiming::new(24, 5));
}

#[test]
fn invalid_settings_are_rejected() {
    let bad_ms = StudioSettings {
        per_item_ms: 50,
        ..StudioSettings::default()
    };
    assert!(Studio::new(bad_ms).is_err());
    let bad_fps = StudioSettings {
        fps: 0,
        ..StudioSettings::default()
    };
    assert!(bad_fps.validate().is_err());
}

#[test]
fn background_resets_stage_area() {
    let studio = studio_with_bg();
    assert_eq!(studio.area(), StageArea::new(120, 150, 560, 300));
}

#[test]
fn import_isolates_bad_files() {
    let mut studio = studio_with_bg();
    let good = encode_png(&solid(10, 10)).unwrap();
    let files: Vec<(&str, Vec<u8>)> = vec![
        ("a.png", good.clone()),
        ("broken.png", b"not an image".to_vec()),
        ("c.png", good),
    ];
    let report = studio.import(&files);
    assert_eq!(report.added.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "broken.png");
    assert_eq!(studio.bundle().len(), 2);
    assert_eq!(studio.trims().len(), 2);
}

#[test]
fn seed_controls_display_order() {
    let mut studio = studio_with_bg();
    for i in 0..6 {
        studio.add_item(ImageAsset::new(format!("{i}.png"), solid(4, 4)));
    }
    studio.set_seed(42);
    let first = studio.display_order();
    assert_eq!(studio.display_order(), first);
    let mut sorted = first.clone();
    sorted.sort();
    assert_eq!(sorted, studio.bundle().ids());

    studio.set_seed(7);
    let other = studio.display_order();
    studio.set_seed(42);
    assert_eq!(studio.display_order(), first);
    assert_ne!(other, first);

    let seed = studio.randomize();
    assert_eq!(studio.seed(), seed);
    assert!(u64::from(seed) < RANDOM_SEED_SPAN);
}

#[test]
fn randomize_mixes_a_fresh_nonce_each_call() {
    let mut studio = studio_with_bg();
    let a = studio.randomize();
    let b = studio.randomize();
    assert_ne!(a, b);
}

#[test]
fn seed_hash_is_fnv1a() {
    assert_eq!(Fnv1a64::new().finish(), 0xcbf2_9ce4_8422_2325);
    let mut h = Fnv1a64::new();
    h.write_u64(42);
    assert_eq!(h.finish(), 0xff3a_dd6b_3789_daef);
}

#[test]
fn two_squares_scenario() {
    let mut studio = studio_with_bg();
    studio.set_settings(StudioSettings {
        gap: 10,
        ..StudioSettings::default()
    })
    .unwrap();
    studio.set_area(StageArea::new(200, 150, 400, 300));
    studio.add_item(ImageAsset::new("a.png", solid(100, 100)));
    studio.add_item(ImageAsset::new("b.png", solid(100, 100)));

    let layout = studio.layout();
    assert_eq!(layout.columns, 2);
    assert_eq!(layout.placements.len(), 2);
    let (a, b) = (layout.placements[0].rect(), layout.placements[1].rect());
    assert!(a.intersect(b).is_none());
    assert_eq!((a.w, a.h), (195, 195));

    let collage = studio.collage().unwrap();
    let p = layout.placements[0];
    assert_eq!(
        collage.pixel(200 + p.x + p.w / 2, 150 + p.y + p.h / 2),
        Some(OPAQUE)
    );
    assert_eq!(collage.pixel(10, 10), Some([0, 0, 0, 255]));
}

#[test]
fn empty_trims_take_no_cell_and_no_single() {
    let mut studio = studio_with_bg();
    let blank = studio.add_item(ImageAsset::new("blank.png", Surface::new(8, 8)));
    studio.add_item(ImageAsset::new("Sun.png", solid(8, 8)));

    assert_eq!(studio.display_order().len(), 2);
    let layout = studio.layout();
    assert_eq!(layout.placements.len(), 1);
    assert!(layout.get(blank).is_none());

    let singles = studio.singles().unwrap();
    assert_eq!(singles.len(), 1);
    let pos = studio
        .display_order()
        .iter()
        .position(|id| *id != blank)
        .unwrap();
    assert_eq!(singles[0].0, format!("single_{:02}_sun-png.png", pos + 1));
}

#[test]
fn replace_item_retrims() {
    let mut studio = studio_with_bg();
    let id = studio.add_item(ImageAsset::new("a.png", solid(10, 10)));
    assert_eq!(studio.trims().get(id).unwrap().size(), Size::new(10, 10));
    studio
        .replace_item(id, ImageAsset::new("a.png", padded(20, 20, 2, 3, 5, 4)))
        .unwrap();
    assert_eq!(studio.trims().get(id).unwrap().size(), Size::new(5, 4));
    assert!(studio.replace_item(ItemId(999), ImageAsset::new("x", solid(1, 1))).is_err());

    assert!(studio.remove_item(id));
    assert!(!studio.remove_item(id));
    assert!(studio.trims().is_empty());
}

#[test]
fn alpha_threshold_change_retrims() {
    let mut studio = studio_with_bg();
    let mut faint = Surface::new(6, 6);
    faint.draw_scaled(
        &Surface::filled(2, 2, [10, 10, 10, 10]),
        PxRect::new(0, 0, 2, 2),
        BlitOpts::default(),
    );
    faint.draw_scaled(&solid(1, 1), PxRect::new(4, 4, 1, 1), BlitOpts::default());
    let id = studio.add_item(ImageAsset::new("faint.png", faint));
    assert_eq!(studio.trims().get(id).unwrap().size(), Size::new(5, 5));

    studio
        .set_settings(StudioSettings {
            alpha_threshold: 100,
            ..studio.settings().clone()
        })
        .unwrap();
    assert_eq!(studio.trims().get(id).unwrap().size(), Size::new(1, 1));
}

#[test]
fn stills_need_a_background() {
    let mut studio = Studio::new(StudioSettings::default()).unwrap();
    studio.add_item(ImageAsset::new("a.png", solid(4, 4)));
    assert!(matches!(studio.collage(), Err(StageError::Validation(_))));
    assert!(studio.move_area(5.0, 5.0).is_err());
}

#[test]
fn area_edits_clamp_to_background() {
    let mut studio = studio_with_bg();
    let moved = studio.move_area(-1000.0, 0.0).unwrap();
    assert_eq!(moved.x, 0);
    let resized = studio.resize_area(Corner::Se, 5000.0, 5000.0).unwrap();
    assert_eq!((resized.w, resized.h), (800, 450));
    studio.set_area(StageArea::new(790, 590, 100, 100));
    assert_eq!(studio.area(), StageArea::new(780, 580, 20, 20));
}

#[test]
fn export_stills_writes_collage_and_singles() {
    let mut studio = studio_with_bg();
    studio.add_item(ImageAsset::new("One.png", solid(10, 10)));
    studio.add_item(ImageAsset::new("Two.png", solid(10, 20)));

    let mut writer = MemoryWriter::new();
    let summary = studio.export_stills(&mut writer).unwrap();
    assert_eq!(summary.files.len(), 3);
    assert_eq!(summary.files[0], COLLAGE_FILE_NAME);
    assert!(writer.get(COLLAGE_FILE_NAME).is_some());
    assert!(writer.names().iter().any(|n| n.ends_with("_one-png.png")));

    studio
        .set_settings(StudioSettings {
            export_singles: false,
            ..studio.settings().clone()
        })
        .unwrap();
    let mut writer = MemoryWriter::new();
    studio.export_stills(&mut writer).unwrap();
    assert_eq!(writer.names(), vec![COLLAGE_FILE_NAME]);
}

fn quick_studio() -> Studio {
    let mut studio = Studio::new(StudioSettings {
        fps: 10,
        per_item_ms: 100,
        gap_ms: 0,
        tail_ms: 500,
        ..StudioSettings::default()
    })
    .unwrap();
    studio.set_background(ImageAsset::new("bg.png", Surface::filled(40, 30, [0, 0, 0, 255])));
    studio.add_item(ImageAsset::new("a.png", solid(4, 4)));
    studio.add_item(ImageAsset::new("b.png", solid(4, 4)));
    studio
}

#[tokio::test(start_paused = true)]
async fn render_video_pushes_animation_plus_tail() {
    let studio = quick_studio();
    let mut sink = InMemorySink::new();
    let art = studio
        .render_video(&mut sink, Pacing::RealTime)
        .await
        .unwrap();
    assert_eq!(studio.renderer().unwrap().total_frames(), 2);
    assert_eq!(art.frame_count, 2 + 5);
    let last = &sink.frames().last().unwrap().1;
    assert_eq!(*last, studio.collage().unwrap());
}

#[tokio::test(start_paused = true)]
async fn concurrent_capture_is_rejected() {
    let studio = quick_studio();
    let mut first = InMemorySink::new();
    let mut second = InMemorySink::new();
    let (a, b) = tokio::join!(
        studio.render_video(&mut first, Pacing::RealTime),
        studio.render_video(&mut second, Pacing::RealTime),
    );
    let busy = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(StageError::CaptureBusy(_))))
        .count();
    assert_eq!(busy, 1);
    assert!(a.is_ok() || b.is_ok());

    // The lock is released once the first capture finishes.
    assert!(studio.render_video(&mut second, Pacing::Offline).await.is_ok());
}

#[tokio::test]
async fn render_video_needs_items() {
    let mut studio = quick_studio();
    studio.reset_bundle();
    let mut sink = InMemorySink::new();
    let err = studio
        .render_video(&mut sink, Pacing::Offline)
        .await
        .unwrap_err();
    assert!(matches!(err, StageError::Validation(_)));
}

#[tokio::test]
async fn export_all_adds_video_after_stills() {
    let studio = quick_studio();
    let mut writer = MemoryWriter::new();
    let mut sink = InMemorySink::new();
    let summary = studio
        .export_all(&mut writer, &mut sink, Pacing::Offline)
        .await
        .unwrap();
    assert_eq!(summary.files.last().map(String::as_str), Some("cover_animation.rgba"));
    assert_eq!(writer.len(), 4);
}
