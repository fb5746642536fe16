use crate::{
    foundation::core::{TILE_BYTES, TILE_HEIGHT, TILE_ROW_BYTES, TILE_WIDTH},
    foundation::error::{DeckError, DeckResult},
    model::display::ImageSettings,
};

const PIXELS: usize = (TILE_WIDTH * TILE_HEIGHT) as usize;
const MID: i16 = 128;

/// Whether pixel `(x, y)` is lit in a packed tile bitmap (row-major, MSB first).
pub fn bit_is_set(bitmap: &[u8], x: u32, y: u32) -> bool {
    if x >= TILE_WIDTH || y >= TILE_HEIGHT {
        return false;
    }
    let idx = y as usize * TILE_ROW_BYTES + (x / 8) as usize;
    bitmap
        .get(idx)
        .is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0)
}

/// Convert a tile-sized 8-bit grayscale buffer into packed device bytes.
///
/// Stages: brightness, contrast, black/white level window, then hard threshold or
/// Floyd-Steinberg error diffusion, then optional inversion, then bit packing.
pub fn to_monochrome(gray: &[u8], settings: &ImageSettings) -> DeckResult<Vec<u8>> {
    if gray.len() != PIXELS {
        return Err(DeckError::validation(format!(
            "to_monochrome expects {PIXELS} gray pixels, got {}",
            gray.len()
        )));
    }

    let adjusted: Vec<u8> = gray
        .iter()
        .map(|&v| {
            let v = adjust_brightness(v, settings.brightness);
            let v = adjust_contrast(v, settings.contrast);
            apply_levels(v, settings.black_threshold, settings.white_threshold)
        })
        .collect();

    let mut lit = if settings.dither {
        floyd_steinberg(&adjusted)
    } else {
        adjusted.iter().map(|&v| i16::from(v) >= MID).collect()
    };

    if settings.invert {
        for px in &mut lit {
            *px = !*px;
        }
    }

    Ok(pack_bits(&lit))
}

fn adjust_brightness(v: u8, pct: i8) -> u8 {
    let pct = i32::from(pct.clamp(-100, 100));
    let v = i32::from(v);
    let out = if pct < 0 {
        v * (100 + pct) / 100
    } else {
        v + (255 - v) * pct / 100
    };
    out.clamp(0, 255) as u8
}

fn adjust_contrast(v: u8, pct: i8) -> u8 {
    let pct = i32::from(pct.clamp(-100, 99));
    let v = i32::from(v);
    let out = (v - 128) * (100 + pct) / (100 - pct) + 128;
    out.clamp(0, 255) as u8
}

fn apply_levels(v: u8, black: u8, white: u8) -> u8 {
    if white <= black {
        return if v > black { 255 } else { 0 };
    }
    if v <= black {
        0
    } else if v >= white {
        255
    } else {
        let span = u32::from(white - black);
        ((u32::from(v - black) * 255 + span / 2) / span) as u8
    }
}

fn floyd_steinberg(gray: &[u8]) -> Vec<bool> {
    let w = TILE_WIDTH as usize;
    let h = TILE_HEIGHT as usize;
    let mut work: Vec<i16> = gray.iter().map(|&v| i16::from(v)).collect();
    let mut lit = vec![false; gray.len()];

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let old = work[idx].clamp(0, 255);
            let on = old >= MID;
            lit[idx] = on;
            let err = old - if on { 255 } else { 0 };

            let mut spread = |dx: isize, dy: usize, weight: i16| {
                let nx = x as isize + dx;
                let ny = y + dy;
                if nx < 0 || nx >= w as isize || ny >= h {
                    return;
                }
                let n = ny * w + nx as usize;
                work[n] = work[n].saturating_add(err * weight / 16);
            };
            spread(1, 0, 7);
            spread(-1, 1, 3);
            spread(0, 1, 5);
            spread(1, 1, 1);
        }
    }

    lit
}

fn pack_bits(lit: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; TILE_BYTES];
    for (i, &on) in lit.iter().enumerate() {
        if on {
            out[i / 8] |= 0x80 >> (i % 8);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/raster/mono.rs"]
mod tests;
