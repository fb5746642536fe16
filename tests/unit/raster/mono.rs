use super::*;

fn plain() -> ImageSettings {
    ImageSettings {
        dither: false,
        black_threshold: 0,
        white_threshold: 255,
        contrast: 0,
        brightness: 0,
        invert: false,
    }
}

fn flat(v: u8) -> Vec<u8> {
    vec![v; PIXELS]
}

#[test]
fn rejects_wrong_size() {
    assert!(to_monochrome(&[0u8; 10], &plain()).is_err());
}

#[test]
fn hard_threshold_splits_at_midpoint() {
    assert!(to_monochrome(&flat(127), &plain()).unwrap().iter().all(|&b| b == 0));
    assert!(to_monochrome(&flat(128), &plain()).unwrap().iter().all(|&b| b == 0xFF));
}

#[test]
fn level_window_clamps_extremes() {
    let s = ImageSettings {
        black_threshold: 100,
        white_threshold: 110,
        ..plain()
    };
    assert!(to_monochrome(&flat(100), &s).unwrap().iter().all(|&b| b == 0));
    assert!(to_monochrome(&flat(106), &s).unwrap().iter().all(|&b| b == 0xFF));
    assert_eq!(apply_levels(50, 100, 100), 0);
    assert_eq!(apply_levels(101, 100, 100), 255);
    assert_eq!(apply_levels(105, 100, 110), 128);
}

#[test]
fn invert_flips_every_bit() {
    let s = ImageSettings {
        invert: true,
        ..plain()
    };
    assert!(to_monochrome(&flat(0), &s).unwrap().iter().all(|&b| b == 0xFF));
}

#[test]
fn brightness_and_contrast_move_values() {
    assert_eq!(adjust_brightness(100, 0), 100);
    assert_eq!(adjust_brightness(100, -100), 0);
    assert_eq!(adjust_brightness(100, 100), 255);
    assert_eq!(adjust_brightness(0, 50), 127);
    assert_eq!(adjust_contrast(128, 80), 128);
    assert_eq!(adjust_contrast(120, 0), 120);
    assert!(adjust_contrast(140, 50) > 140);
    assert!(adjust_contrast(140, -50) < 140);
    assert_eq!(adjust_contrast(0, 99), 0);
}

#[test]
fn dithering_mid_gray_lights_about_half() {
    let s = ImageSettings {
        dither: true,
        ..plain()
    };
    let packed = to_monochrome(&flat(128), &s).unwrap();
    let lit: u32 = packed.iter().map(|b| b.count_ones()).sum();
    let total = PIXELS as u32;
    assert!(lit > total * 2 / 5 && lit < total * 3 / 5, "lit={lit}");
    assert_eq!(packed, to_monochrome(&flat(128), &s).unwrap());
}

#[test]
fn packing_is_msb_first_row_major() {
    let mut gray = flat(0);
    gray[0] = 255;
    gray[TILE_WIDTH as usize + 9] = 255;
    let packed = to_monochrome(&gray, &plain()).unwrap();
    assert_eq!(packed.len(), TILE_BYTES);
    assert_eq!(packed[0], 0x80);
    assert_eq!(packed[TILE_ROW_BYTES + 1], 0x40);
    assert!(bit_is_set(&packed, 0, 0));
    assert!(bit_is_set(&packed, 9, 1));
    assert!(!bit_is_set(&packed, 1, 0));
}
