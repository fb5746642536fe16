use std::io::Cursor;

use super::*;

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn sniffs_svg_markup() {
    assert!(looks_like_svg(b"  <svg/>"));
    assert!(looks_like_svg(b"\xEF\xBB\xBF<?xml version=\"1.0\"?>"));
    assert!(!looks_like_svg(b"\x89PNG"));
    assert!(!looks_like_svg(b""));
}

#[test]
fn png_flattens_alpha_over_black() {
    let opts = usvg::Options::default();
    let white = decode_source(&png(4, 2, [255, 255, 255, 255]), &opts).unwrap();
    let gray = white.to_gray(8, 4).unwrap();
    assert_eq!(gray.len(), 32);
    assert!(gray.iter().all(|&v| v >= 250));

    let clear = decode_source(&png(4, 2, [255, 255, 255, 0]), &opts).unwrap();
    assert!(clear.to_gray(8, 4).unwrap().iter().all(|&v| v == 0));
}

#[test]
fn svg_scales_to_cover() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"><rect width="2" height="2" fill="#fff"/></svg>"##;
    let opts = usvg::Options::default();
    let src = decode_source(svg, &opts).unwrap();
    assert!(matches!(src, SourceImage::Svg(_)));
    let gray = src.to_gray(16, 8).unwrap();
    assert_eq!(gray.len(), 128);
    assert!(gray.iter().all(|&v| v >= 250));
}

#[test]
fn corrupt_sources_are_image_decode_errors() {
    let opts = usvg::Options::default();
    let bad_inputs: [&[u8]; 3] = [b"", b"\x89PNG\r\n\x1a\nnot really", b"<svg"];
    for bad in bad_inputs {
        let err = decode_source(bad, &opts).unwrap_err();
        assert!(matches!(err, DeckError::ImageDecode(_)), "{err}");
    }
}

#[test]
fn zero_sized_box_yields_nothing() {
    let opts = usvg::Options::default();
    let src = decode_source(&png(1, 1, [9, 9, 9, 255]), &opts).unwrap();
    assert!(src.to_gray(0, 10).unwrap().is_empty());
}
