use super::*;
use crate::{
    codec::encode::encode_document,
    model::document::{ConfigDocument, Page},
};

fn encoded(pages: usize) -> (ConfigDocument, Vec<u8>) {
    let mut doc = ConfigDocument::default();
    for p in 0..pages {
        let mut page = Page::with_tiles(doc.tile_count());
        for (t, display) in page.displays.iter_mut().enumerate() {
            display.set_converted_image(vec![(p * 16 + t) as u8; TILE_BYTES]);
        }
        doc.pages.push(page);
    }
    let buf = encode_document(&doc).unwrap();
    (doc, buf)
}

#[test]
fn slices_one_page_of_the_image_body() {
    let (doc, buf) = encoded(3);
    let bytes = page_image_bytes(&buf, 1).unwrap();
    assert_eq!(bytes.len(), 6 * TILE_BYTES);

    let tiles = parse_page(bytes).unwrap();
    assert_eq!(tiles.len(), 6);
    for (tile, display) in tiles.iter().zip(&doc.pages[1].displays) {
        assert_eq!(*tile, display.converted_image());
    }
    assert!(page_image_bytes(&buf, 3).is_err());
}

#[test]
fn truncated_buffers_fail_to_slice() {
    let (_, buf) = encoded(2);
    let cut = crate::codec::layout::HEADER_LEN + 12 * 32 + TILE_BYTES * 7;
    assert!(matches!(
        page_image_bytes(&buf[..cut], 1),
        Err(DeckError::Format(_))
    ));
    assert!(page_image_bytes(&buf[..cut], 0).is_ok());
}

#[test]
fn parse_page_rejects_partial_tiles() {
    assert!(parse_page(&[]).unwrap().is_empty());
    assert!(matches!(
        parse_page(&[0u8; TILE_BYTES + 1]),
        Err(DeckError::Format(_))
    ));
}

#[test]
fn tile_rows_are_sixteen_bytes() {
    let mut tile = vec![0u8; TILE_BYTES];
    tile[TILE_ROW_BYTES * 63] = 0x80;
    let rows: Vec<&[u8]> = tile_rows(&tile).unwrap().collect();
    assert_eq!(rows.len(), 64);
    assert!(rows.iter().all(|r| r.len() == TILE_ROW_BYTES));
    assert_eq!(rows[63][0], 0x80);
    assert!(tile_rows(&tile[1..]).is_err());
}
