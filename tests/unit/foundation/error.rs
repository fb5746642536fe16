use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DeckError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(DeckError::format("x").to_string().contains("format error:"));
    assert!(
        DeckError::image_decode("x")
            .to_string()
            .contains("image decode error:")
    );
    assert!(
        DeckError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DeckError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: DeckError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, DeckError::Serde(_)));
}
