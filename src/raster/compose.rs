use crate::{
    foundation::core::{TILE_HEIGHT, TILE_WIDTH},
    foundation::error::{DeckError, DeckResult},
    model::display::Display,
    raster::fonts::{FontOptions, FontSpec, build_usvg_options},
    raster::mono::to_monochrome,
    raster::source::decode_source,
    raster::text::{Band, render_text},
};

/// Vector arrow used as the built-in default-back image.
pub const DEFAULT_BACK_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="128" height="64" viewBox="0 0 128 64"><path d="M18 32 L50 8 L50 22 L110 22 L110 42 L50 42 L50 56 Z" fill="#fff"/></svg>"##;

/// Deterministic display renderer: source image and/or text plus settings to device bitmap.
///
/// The pipeline is pure for a given font database: identical displays always produce
/// byte-identical bitmaps.
pub struct ImagePipeline {
    usvg: usvg::Options<'static>,
}

impl std::fmt::Debug for ImagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePipeline")
            .field("font_faces", &self.font_face_count())
            .finish()
    }
}

impl Default for ImagePipeline {
    fn default() -> Self {
        Self::new(&FontOptions::system())
    }
}

impl ImagePipeline {
    /// Build a pipeline whose text rendering uses the fonts described by `fonts`.
    pub fn new(fonts: &FontOptions) -> Self {
        Self {
            usvg: build_usvg_options(fonts),
        }
    }

    /// Number of font faces available to text rendering.
    pub fn font_face_count(&self) -> usize {
        self.usvg.fontdb.len()
    }

    /// Render a display the way the editor does after a settings change: text composition when
    /// no source image is attached, image composition otherwise.
    pub fn render(&self, display: &Display) -> DeckResult<Vec<u8>> {
        if display.original_image.is_none() {
            self.compose_text(display)
        } else {
            self.compose_image(display)
        }
    }

    #[tracing::instrument(skip(self, display))]
    /// Text-first composition. An attached source image is drawn as an icon left of the text.
    pub fn compose_text(&self, display: &Display) -> DeckResult<Vec<u8>> {
        let gray = self.compose_gray(display)?;
        to_monochrome(&gray, &display.image_settings)
    }

    #[tracing::instrument(skip(self, display))]
    /// Image-first composition. The source fills the tile, or only the icon area when text is
    /// set. Fails with [`DeckError::ImageDecode`] when no source is attached.
    pub fn compose_image(&self, display: &Display) -> DeckResult<Vec<u8>> {
        if display.original_image.is_none() {
            return Err(DeckError::image_decode("display has no source image"));
        }
        let gray = self.compose_gray(display)?;
        to_monochrome(&gray, &display.image_settings)
    }

    /// Built-in default-back template: the arrow image rendered with default settings.
    pub fn default_back_display(&self) -> DeckResult<Display> {
        let mut display = Display::default();
        display.original_image = Some(DEFAULT_BACK_SVG.as_bytes().to_vec());
        let bitmap = self.compose_image(&display)?;
        display.set_converted_image(bitmap);
        Ok(display)
    }

    fn compose_gray(&self, display: &Display) -> DeckResult<Vec<u8>> {
        let mut canvas = vec![0u8; (TILE_WIDTH * TILE_HEIGHT) as usize];

        let source = display
            .original_image
            .as_deref()
            .map(|bytes| decode_source(bytes, &self.usvg))
            .transpose()?;

        let text_band = match &source {
            Some(src) if display.has_text() => {
                let icon_w = icon_width(display.text_with_icon_settings.icon_width_multiplier);
                blit(&mut canvas, 0, icon_w, &src.to_gray(icon_w, TILE_HEIGHT)?);
                Band {
                    x: icon_w,
                    width: TILE_WIDTH - icon_w,
                }
            }
            Some(src) => {
                blit(&mut canvas, 0, TILE_WIDTH, &src.to_gray(TILE_WIDTH, TILE_HEIGHT)?);
                return Ok(canvas);
            }
            None => Band::FULL,
        };

        if display.has_text() {
            let font = FontSpec::parse(&display.text_settings.font);
            let coverage = render_text(&display.text_settings.text, &font, text_band, &self.usvg)?;
            for (dst, src) in canvas.iter_mut().zip(coverage) {
                *dst = (*dst).max(src);
            }
        }
        Ok(canvas)
    }
}

/// Icon area width for `multiplier` tile heights, clamped to the tile.
pub fn icon_width(multiplier: f32) -> u32 {
    let w = (TILE_HEIGHT as f32 * multiplier).round();
    if !w.is_finite() || w <= 0.0 {
        return 0;
    }
    (w as u32).min(TILE_WIDTH)
}

fn blit(canvas: &mut [u8], x0: u32, width: u32, pixels: &[u8]) {
    if width == 0 {
        return;
    }
    for (y, row) in pixels.chunks_exact(width as usize).enumerate() {
        let start = y * TILE_WIDTH as usize + x0 as usize;
        canvas[start..start + row.len()].copy_from_slice(row);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/compose.rs"]
mod tests;
