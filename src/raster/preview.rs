use std::io::Cursor;

use anyhow::Context;

use crate::{
    foundation::core::{TILE_HEIGHT, TILE_WIDTH},
    foundation::error::DeckResult,
    raster::mono::bit_is_set,
};

const LIT: u8 = 255;
const DARK: u8 = 0;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Renderable 8-bit grayscale view of a packed tile bitmap.
pub struct Preview {
    image: image::GrayImage,
}

impl Preview {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether the pixel at `(x, y)` is lit. Out-of-range coordinates are dark.
    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        self.image
            .get_pixel_checked(x, y)
            .is_some_and(|p| p.0[0] == LIT)
    }

    /// Underlying grayscale image.
    pub fn as_image(&self) -> &image::GrayImage {
        &self.image
    }

    /// Encode the preview as a PNG file.
    pub fn to_png(&self) -> DeckResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode preview png")?;
        Ok(buf)
    }
}

/// Derive the preview of a packed tile bitmap.
///
/// Missing trailing bytes (short bitmaps) render as dark pixels.
pub fn preview_from(bitmap: &[u8]) -> Preview {
    let image = image::GrayImage::from_fn(TILE_WIDTH, TILE_HEIGHT, |x, y| {
        if bit_is_set(bitmap, x, y) {
            image::Luma([LIT])
        } else {
            image::Luma([DARK])
        }
    });
    Preview { image }
}
