use super::*;

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("layerforge-store-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("state.json")
}

#[test]
fn memory_store_round_trips() {
    let mut s = MemoryStore::new();
    assert_eq!(s.get("k").unwrap(), None);
    s.set("k", "v").unwrap();
    assert_eq!(s.get("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn file_store_persists_across_reopen() {
    let path = temp_path("reopen");
    {
        let mut s = JsonFileStore::open(&path).unwrap();
        assert_eq!(s.get("counter").unwrap(), None);
        s.set("counter", "42").unwrap();
        s.set("recent", "[1,2]").unwrap();
    }
    let s = JsonFileStore::open(&path).unwrap();
    assert_eq!(s.get("counter").unwrap().as_deref(), Some("42"));
    assert_eq!(s.get("recent").unwrap().as_deref(), Some("[1,2]"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn corrupt_file_is_a_storage_error() {
    let path = temp_path("corrupt");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();
    let err = JsonFileStore::open(&path).unwrap_err();
    assert!(matches!(err, ForgeError::Storage(_)));
}
