use crate::foundation::error::{DeckError, DeckResult};

/// Decoded source image attached to a display.
pub enum SourceImage {
    /// Bitmap formats handled by the `image` crate.
    Raster(image::DynamicImage),
    /// Parsed SVG document.
    Svg(usvg::Tree),
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raster(img) => f
                .debug_struct("Raster")
                .field("width", &img.width())
                .field("height", &img.height())
                .finish(),
            Self::Svg(tree) => f
                .debug_struct("Svg")
                .field("width", &tree.size().width())
                .field("height", &tree.size().height())
                .finish(),
        }
    }
}

/// Whether `bytes` look like SVG markup rather than an encoded bitmap.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'<')
}

/// Decode an attached source image.
pub fn decode_source(bytes: &[u8], opts: &usvg::Options<'_>) -> DeckResult<SourceImage> {
    if bytes.is_empty() {
        return Err(DeckError::image_decode("source image is empty"));
    }
    if looks_like_svg(bytes) {
        let tree = usvg::Tree::from_data(bytes, opts)
            .map_err(|e| DeckError::image_decode(format!("parse svg: {e}")))?;
        return Ok(SourceImage::Svg(tree));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| DeckError::image_decode(format!("decode image from memory: {e}")))?;
    Ok(SourceImage::Raster(img))
}

impl SourceImage {
    /// Scale to cover a `width` x `height` box, center-crop, flatten over black and return
    /// row-major 8-bit luma.
    pub fn to_gray(&self, width: u32, height: u32) -> DeckResult<Vec<u8>> {
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }
        match self {
            Self::Raster(img) => Ok(raster_to_gray(img, width, height)),
            Self::Svg(tree) => svg_to_gray(tree, width, height),
        }
    }
}

fn raster_to_gray(img: &image::DynamicImage, width: u32, height: u32) -> Vec<u8> {
    let fitted = img.resize_to_fill(width, height, image::imageops::FilterType::Triangle);
    fitted
        .to_rgba8()
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            premul_luma(
                mul_alpha(r, a),
                mul_alpha(g, a),
                mul_alpha(b, a),
            )
        })
        .collect()
}

fn svg_to_gray(tree: &usvg::Tree, width: u32, height: u32) -> DeckResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| DeckError::image_decode("failed to allocate svg pixmap"))?;

    let size = tree.size();
    let (sw, sh) = (size.width(), size.height());
    if !(sw.is_finite() && sh.is_finite() && sw > 0.0 && sh > 0.0) {
        return Err(DeckError::image_decode("svg has invalid width/height"));
    }
    let scale = (width as f32 / sw).max(height as f32 / sh);
    let tx = (width as f32 - sw * scale) / 2.0;
    let ty = (height as f32 - sh * scale) / 2.0;
    let xform = resvg::tiny_skia::Transform::from_row(scale, 0.0, 0.0, scale, tx, ty);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap
        .data()
        .chunks_exact(4)
        .map(|px| premul_luma(px[0], px[1], px[2]))
        .collect())
}

fn mul_alpha(c: u8, a: u8) -> u8 {
    ((u16::from(c) * u16::from(a) + 127) / 255) as u8
}

// Premultiplied channels are already composited over black.
fn premul_luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114 + 500) / 1000) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/raster/source.rs"]
mod tests;
