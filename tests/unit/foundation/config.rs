use super::*;

#[test]
fn defaults_validate() {
    EngineConfig::default().validate().unwrap();
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: EngineConfig = serde_json::from_str(r#"{ "handle_radius": 20.0 }"#).unwrap();
    assert_eq!(cfg.handle_radius, 20.0);
    assert_eq!(cfg.rotate_handle_offset, 24.0);
    assert_eq!(cfg.history_len, 400);
    assert_eq!(cfg.export_prefix, "pfp");
}

#[test]
fn inverted_ranges_are_rejected() {
    let cfg = EngineConfig {
        photo_scale: ScaleRange::new(300.0, 100.0),
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = EngineConfig {
        min_css_size: 800.0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn prefix_must_be_a_file_name_fragment() {
    let cfg = EngineConfig {
        export_prefix: "../evil".to_string(),
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn from_json_file_reads_and_validates() {
    let dir = std::env::temp_dir().join(format!("layerforge_cfg_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cfg.json");
    std::fs::write(&path, r#"{ "noise_tile_px": 64 }"#).unwrap();
    let cfg = EngineConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.noise_tile_px, 64);

    std::fs::write(&path, r#"{ "noise_tile_px": 0 }"#).unwrap();
    assert!(EngineConfig::from_json_file(&path).is_err());
    std::fs::remove_dir_all(&dir).ok();
}
