use super::*;
use crate::{
    codec::encode::encode_document,
    codec::layout::{BUTTON_LEN, HEADER_LEN},
    foundation::core::FormatVersion,
    model::action::{Action, ActionKind},
};

fn sample() -> ConfigDocument {
    let mut doc = ConfigDocument::default();
    doc.brightness = 90;
    doc.tile_grid_width = 2;
    doc.tile_grid_height = 2;
    for _ in 0..3 {
        doc.pages.push(Page::with_tiles(4));
    }
    doc.pages[0].buttons[1].primary = Action::change_page(2);
    doc.pages[2].buttons[0].primary = Action::new(ActionKind::Text {
        chars: vec![u16::from(b'h'), u16::from(b'i')],
    });
    doc.pages[2].buttons[0].secondary = Action::new(ActionKind::Settings {
        setting: 1,
        value: 40,
    });

    let d = &mut doc.pages[2].displays[3];
    d.set_converted_image((0..TILE_BYTES).map(|i| (i * 7) as u8).collect());
    d.image_settings.dither = true;
    d.image_settings.contrast = -25;
    d.image_settings.black_threshold = 10;
    d.text_settings.text = "Mute\nAll".to_string();
    d.text_settings.font = "12px Mono".to_string();
    d.text_with_icon_settings.icon_width_multiplier = 0.75;
    d.original_image = Some(vec![1, 2, 3]);

    let back = &mut doc.pages[2].displays[0];
    back.is_generated_from_default_back_image = true;
    back.previous_page = Some(0);
    back.previous_display = Some(1);

    doc.default_back_display.set_converted_image(vec![0x3C; TILE_BYTES]);
    doc.default_back_display.image_settings.invert = true;
    doc
}

#[test]
fn round_trip_keeps_everything_but_sources() {
    let doc = sample();
    let back = decode_document(&encode_document(&doc).unwrap()).unwrap();

    assert_eq!(back.format_version, doc.format_version);
    assert_eq!(back.brightness, 90);
    assert_eq!((back.tile_grid_width, back.tile_grid_height), (2, 2));
    assert_eq!(back.pages.len(), 3);
    for (a, b) in doc.buttons().zip(back.buttons()) {
        assert_eq!(a, b);
    }
    for ((_, a), (_, b)) in doc.displays().zip(back.displays()) {
        assert_eq!(a.converted_image(), b.converted_image());
        assert_eq!(a.image_settings, b.image_settings);
        assert_eq!(a.text_settings, b.text_settings);
        assert_eq!(a.previous_page, b.previous_page);
        assert_eq!(a.previous_display, b.previous_display);
        assert_eq!(
            a.is_generated_from_default_back_image,
            b.is_generated_from_default_back_image
        );
        assert_eq!(b.original_image, None);
        assert_eq!(b.preview(), &crate::raster::preview::preview_from(b.converted_image()));
    }
    assert_eq!(back.pages[2].displays[3].text_with_icon_settings.icon_width_multiplier, 0.75);
    assert_eq!(back.default_back_display, doc.default_back_display);
}

#[test]
fn version_1_0_buffers_decode_with_default_settings() {
    let mut doc = sample();
    doc.format_version = FormatVersion::new(1, 0, 4);
    let back = decode_document(&encode_document(&doc).unwrap()).unwrap();
    assert_eq!(back.format_version, FormatVersion::new(1, 0, 4));
    let d = &back.pages[2].displays[3];
    assert_eq!(d.converted_image(), doc.pages[2].displays[3].converted_image());
    assert_eq!(d.text_settings.text, "");
    assert!(!back.pages[2].displays[0].is_generated_from_default_back_image);
}

#[test]
fn every_truncation_is_a_format_error() {
    let buf = encode_document(&sample()).unwrap();
    for len in [0, 5, HEADER_LEN, HEADER_LEN + BUTTON_LEN + 3, 600, 6000, buf.len() - 1] {
        let err = decode_document(&buf[..len]).unwrap_err();
        assert!(matches!(err, DeckError::Format(_)), "len {len}: {err}");
    }
}

#[test]
fn oversized_shape_in_a_short_buffer_is_rejected_up_front() {
    let mut header = Vec::new();
    Header {
        version: FormatVersion::CURRENT,
        width: 16,
        height: 16,
        brightness: 200,
        page_count: u16::MAX,
        image_offset: (HEADER_LEN + usize::from(u16::MAX) * 256 * BUTTON_LEN) as u32,
    }
    .write(&mut header);
    assert_eq!(header.len(), HEADER_LEN);

    let err = decode_document(&header).unwrap_err();
    assert!(matches!(err, DeckError::Format(_)), "{err}");
    assert!(err.to_string().contains("need at least"), "{err}");
}

#[test]
fn minimum_length_matches_an_empty_document() {
    let mut doc = sample();
    for d in doc.pages.iter_mut().flat_map(|p| p.displays.iter_mut()) {
        d.text_settings = Default::default();
    }
    doc.default_back_display.text_settings = Default::default();
    let buf = encode_document(&doc).unwrap();
    let header = Header::read(&buf).unwrap();
    assert_eq!(header.min_buffer_len(), Some(buf.len()));
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut buf = encode_document(&sample()).unwrap();
    buf.push(0);
    let err = decode_document(&buf).unwrap_err();
    assert!(err.to_string().contains("trailing"));
}

#[test]
fn header_shape_errors() {
    let buf = encode_document(&sample()).unwrap();

    let mut bad = buf.clone();
    bad[0] = 2;
    assert!(decode_document(&bad).unwrap_err().to_string().contains("version"));

    let mut bad = buf.clone();
    bad[3] = 0;
    assert!(matches!(decode_document(&bad), Err(DeckError::Format(_))));

    let mut bad = buf.clone();
    bad[8] ^= 1;
    assert!(decode_document(&bad).unwrap_err().to_string().contains("offset"));

    let mut bad = buf;
    bad[6] = 4;
    assert!(matches!(decode_document(&bad), Err(DeckError::Format(_))));
}

#[test]
fn malformed_actions_are_rejected() {
    let buf = encode_document(&sample()).unwrap();

    let mut bad = buf.clone();
    bad[HEADER_LEN] = 9;
    assert!(decode_document(&bad).unwrap_err().to_string().contains("unknown action"));

    let mut bad = buf.clone();
    bad[HEADER_LEN + 2] = 7;
    assert!(matches!(decode_document(&bad), Err(DeckError::Format(_))));

    // Second button's primary targets page 2; point it past the last page.
    let mut bad = buf;
    let values = HEADER_LEN + BUTTON_LEN + 4;
    bad[values..values + 2].copy_from_slice(&9u16.to_le_bytes());
    let err = decode_document(&bad).unwrap_err();
    assert!(matches!(err, DeckError::Format(_)));
    assert!(err.to_string().contains("inconsistent"));
}

#[test]
fn noop_ignores_stray_values() {
    let mut buf = encode_document(&sample()).unwrap();
    buf[HEADER_LEN + 2] = 2;
    buf[HEADER_LEN + 4] = 5;
    let doc = decode_document(&buf).unwrap();
    assert_eq!(doc.pages[0].buttons[0].primary, Action::new(ActionKind::Noop));
}
