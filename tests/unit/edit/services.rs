use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("deckcfg-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn memory_store_round_trips_values() {
    let mut store = MemoryTemplateStore::new();
    assert_eq!(store.get(DEFAULT_BACK_DISPLAY_KEY).unwrap(), None);
    store.set(DEFAULT_BACK_DISPLAY_KEY, "{}").unwrap();
    store.set(DEFAULT_BACK_DISPLAY_KEY, "{\"a\":1}").unwrap();
    assert_eq!(
        store.get(DEFAULT_BACK_DISPLAY_KEY).unwrap().as_deref(),
        Some("{\"a\":1}")
    );
}

#[test]
fn file_store_creates_its_directory_and_reads_back() {
    let dir = temp_dir("store");
    let mut store = FileTemplateStore::new(&dir);
    assert_eq!(store.get(DEFAULT_BACK_DISPLAY_KEY).unwrap(), None);

    store.set(DEFAULT_BACK_DISPLAY_KEY, "template").unwrap();
    assert!(dir.join("defaultBackDisplay.json").is_file());
    assert_eq!(
        FileTemplateStore::new(&dir)
            .get(DEFAULT_BACK_DISPLAY_KEY)
            .unwrap()
            .as_deref(),
        Some("template")
    );
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn file_store_rejects_path_like_keys() {
    let mut store = FileTemplateStore::new(temp_dir("keys"));
    assert!(matches!(
        store.set("../escape", "x"),
        Err(DeckError::Validation(_))
    ));
    assert!(store.get("").is_err());
}

#[test]
fn buffer_source_passes_through() {
    let bytes = read_source(ConfigSource::Buffer(vec![1, 2, 3])).unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
}

#[test]
fn file_source_reads_the_first_file() {
    let dir = temp_dir("source");
    std::fs::create_dir_all(&dir).unwrap();
    let first = dir.join("a.bin");
    let second = dir.join("b.bin");
    std::fs::write(&first, [7u8, 8]).unwrap();
    std::fs::write(&second, [9u8]).unwrap();

    let bytes = read_source(ConfigSource::Files(vec![first, second])).unwrap();
    assert_eq!(bytes, vec![7, 8]);

    let err = read_source(ConfigSource::Files(vec![dir.join("missing.bin")])).unwrap_err();
    assert!(err.to_string().contains("read config from"));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_file_list_is_rejected() {
    assert!(matches!(
        read_source(ConfigSource::Files(Vec::new())),
        Err(DeckError::Validation(_))
    ));
}

#[test]
fn vec_transport_keeps_the_last_buffer() {
    let mut sink = vec![0u8; 4];
    sink.send(&[1, 2]).unwrap();
    assert_eq!(sink, vec![1, 2]);
}

#[test]
fn notices_render_readable_messages() {
    let n = Notice::ImageNotRendered {
        slot: Some(SlotRef::new(1, 2)),
        message: "bad png".to_string(),
    };
    assert_eq!(n.to_string(), "could not render page 1 button 2: bad png");
}
