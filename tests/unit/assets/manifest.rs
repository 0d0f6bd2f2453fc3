use super::*;

#[test]
fn mixed_item_shapes_are_accepted() {
    let text = r#"{ "items": ["a.png", { "file": "b.png" }, "  ", { "file": "/c.png" }] }"#;
    let cat = OverlayCatalog::from_json("https://cdn.example/overlays/", text).unwrap();
    assert!(!cat.is_fallback());
    let urls: Vec<&str> = cat.sources().iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://cdn.example/overlays/a.png",
            "https://cdn.example/overlays/b.png",
            "https://cdn.example/overlays/c.png",
        ]
    );
    assert_eq!(cat.sources()[1].file, "b.png");
}

#[test]
fn empty_or_malformed_manifest_is_an_error() {
    assert!(OverlayCatalog::from_json("", r#"{ "items": [] }"#).is_err());
    assert!(OverlayCatalog::from_json("", r#"{ "things": [] }"#).is_err());
    assert!(OverlayCatalog::from_json("", r#"{ "items": [42] }"#).is_err());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let cat = OverlayCatalog::from_path("assets", Path::new("/nonexistent/manifest.json"));
    assert!(cat.is_fallback());
    assert_eq!(cat.sources().len(), DEFAULT_OVERLAY_FILES.len());
    assert_eq!(cat.sources()[0].url, "assets/hat.png");
}

#[test]
fn asset_url_joining() {
    assert_eq!(asset_url("", "x.png"), "x.png");
    assert_eq!(asset_url("base//", "//x.png"), "base/x.png");
    assert_eq!(asset_url("base", "https://other/x.png"), "https://other/x.png");
}
