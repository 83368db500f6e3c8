use super::*;
use crate::assets::decode::encode_png;
use crate::render::surface::Surface;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stagegrid-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn minimal_project_gets_editor_defaults() {
    let cfg = ProjectConfig::from_reader(r#"{ "background": "bg.png" }"#.as_bytes()).unwrap();
    assert!(cfg.items.is_empty());
    assert_eq!(cfg.area, None);
    assert_eq!(cfg.settings(), StudioSettings::default());
    cfg.validate().unwrap();
}

#[test]
fn full_project_parses() {
    let json = r#"{
        "background": "bg.png",
        "items": ["a.png", "b.png"],
        "area": { "x": 10, "y": 20, "w": 300, "h": 200 },
        "columns": 3,
        "gap": 4,
        "seed": 42,
        "transition": "wipe",
        "per_item_ms": 500,
        "gap_ms": 0,
        "fps": 24,
        "tail_ms": 1000,
        "alpha_threshold": 8,
        "export_singles": false,
        "video_format": "mp4"
    }"#;
    let cfg = ProjectConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.area, Some(StageArea::new(10, 20, 300, 200)));
    let s = cfg.settings();
    assert_eq!(s.transition, Transition::Wipe);
    assert_eq!(s.video_format, VideoFormat::Mp4);
    assert_eq!((s.seed, s.columns, s.gap, s.fps), (42, 3, 4, 24));
    assert!(!s.export_singles);
}

#[test]
fn unknown_fields_and_bad_values_are_rejected() {
    let err = ProjectConfig::from_reader(r#"{ "background": "bg.png", "colums": 2 }"#.as_bytes())
        .unwrap_err();
    assert!(matches!(err, StageError::Serde(_)), "{err}");

    let err = ProjectConfig::from_reader(r#"{ "background": "bg.png", "transition": "spin" }"#.as_bytes())
        .unwrap_err();
    assert!(matches!(err, StageError::Serde(_)), "{err}");

    let cfg = ProjectConfig::from_reader(r#"{ "background": "bg.png", "per_item_ms": 20 }"#.as_bytes())
        .unwrap();
    assert!(matches!(cfg.validate(), Err(StageError::Validation(_))));

    let cfg = ProjectConfig::from_reader(
        r#"{ "background": "bg.png", "area": { "x": 0, "y": 0, "w": 5, "h": 50 } }"#.as_bytes(),
    )
    .unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn missing_project_file_is_a_validation_error() {
    let err = ProjectConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, StageError::Validation(_)));
}

#[test]
fn into_studio_loads_images_and_isolates_failures() {
    let dir = temp_dir("project");
    let bg = encode_png(&Surface::filled(100, 80, [0, 0, 0, 255])).unwrap();
    let item = encode_png(&Surface::filled(10, 10, [255, 255, 255, 255])).unwrap();
    std::fs::write(dir.join("bg.png"), bg).unwrap();
    std::fs::write(dir.join("one.png"), &item).unwrap();
    std::fs::write(dir.join("corrupt.png"), b"garbage").unwrap();

    let cfg = ProjectConfig {
        items: vec!["one.png".into(), "corrupt.png".into(), "missing.png".into()],
        ..ProjectConfig::from_reader(r#"{ "background": "bg.png" }"#.as_bytes()).unwrap()
    };
    let (studio, report) = cfg.into_studio(&dir).unwrap();
    assert_eq!(report.added.len(), 1);
    let failed: Vec<&str> = report.failed.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["corrupt.png", "missing.png"]);
    assert_eq!(studio.bundle().len(), 1);
    assert_eq!(studio.area(), StageArea::new(15, 20, 70, 40));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn into_studio_requires_background() {
    let dir = temp_dir("nobg");
    let cfg = ProjectConfig::from_reader(r#"{ "background": "absent.png" }"#.as_bytes()).unwrap();
    assert!(cfg.into_studio(&dir).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
