use super::*;
use crate::{
    foundation::core::FormatVersion,
    model::action::{Action, ActionKind},
    model::document::Page,
};

const EMPTY_SETTINGS_LEN: usize = 18;

fn doc_with_pages(n: usize) -> ConfigDocument {
    let mut doc = ConfigDocument::default();
    for _ in 0..n {
        doc.pages.push(Page::with_tiles(doc.tile_count()));
    }
    doc
}

#[test]
fn empty_document_is_header_footer_and_extension_count() {
    let doc = ConfigDocument::default();
    let out = encode_document(&doc).unwrap();
    assert_eq!(out.len(), HEADER_LEN + EMPTY_SETTINGS_LEN + TILE_BYTES + 4);
    assert_eq!(&out[..6], &[1, 1, 0, 3, 2, 200]);
    assert_eq!(&out[6..8], &0u16.to_le_bytes());
    assert_eq!(&out[8..12], &(HEADER_LEN as u32).to_le_bytes());
    assert_eq!(&out[12..16], &[0; 4]);
    assert_eq!(&out[out.len() - 4..], &0u32.to_le_bytes());
}

#[test]
fn buttons_are_written_in_fixed_records() {
    let mut doc = doc_with_pages(2);
    doc.pages[1].buttons[5].primary = Action::new(ActionKind::Hotkey {
        keys: vec![0xE0, 0x04],
    });
    doc.pages[1].buttons[5].secondary = Action {
        kind: ActionKind::ChangePage { page: 0 },
        enabled: false,
    };
    let out = encode_document(&doc).unwrap();

    let slots = 12;
    assert_eq!(&out[6..8], &2u16.to_le_bytes());
    assert_eq!(
        &out[8..12],
        &((HEADER_LEN + slots * BUTTON_LEN) as u32).to_le_bytes()
    );
    assert_eq!(
        out.len(),
        HEADER_LEN
            + slots * BUTTON_LEN
            + slots * TILE_BYTES
            + EMPTY_SETTINGS_LEN
            + TILE_BYTES
            + 4
            + slots * EMPTY_SETTINGS_LEN
    );

    let first = &out[HEADER_LEN..HEADER_LEN + BUTTON_LEN];
    assert_eq!(&first[..4], &[0, 1, 0, 0]);
    assert_eq!(&first[16..20], &[0, 0, 0, 0]);

    let last = HEADER_LEN + 11 * BUTTON_LEN;
    let rec = &out[last..last + BUTTON_LEN];
    assert_eq!(&rec[..8], &[2, 1, 2, 0, 0xE0, 0, 0x04, 0]);
    assert!(rec[8..16].iter().all(|&b| b == 0));
    assert_eq!(&rec[16..22], &[1, 0, 1, 0, 0, 0]);
}

#[test]
fn version_1_0_omits_the_settings_extension() {
    let mut doc = doc_with_pages(1);
    doc.format_version = FormatVersion::new(1, 0, 0);
    let out = encode_document(&doc).unwrap();
    assert_eq!(
        out.len(),
        HEADER_LEN + 6 * BUTTON_LEN + 6 * TILE_BYTES + EMPTY_SETTINGS_LEN + TILE_BYTES
    );
}

#[test]
fn invalid_documents_are_not_encoded() {
    let mut doc = doc_with_pages(1);
    doc.pages[0].buttons[0].primary = Action::change_page(3);
    assert!(matches!(
        encode_document(&doc),
        Err(DeckError::Validation(_))
    ));

    let mut doc = doc_with_pages(1);
    doc.format_version = FormatVersion::new(2, 0, 0);
    assert!(encode_document(&doc).is_err());
}

#[test]
fn oversized_text_is_rejected() {
    let mut doc = doc_with_pages(1);
    doc.pages[0].displays[0].text_settings.text = "x".repeat(70_000);
    assert!(matches!(
        encode_document(&doc),
        Err(DeckError::Validation(_))
    ));
}
