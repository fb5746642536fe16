use crate::{
    foundation::core::TILE_BYTES,
    raster::preview::{Preview, preview_from},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Grayscale-to-monochrome conversion settings of one display.
pub struct ImageSettings {
    /// Floyd-Steinberg error diffusion instead of a hard threshold.
    pub dither: bool,
    /// Gray levels at or below this become black.
    pub black_threshold: u8,
    /// Gray levels at or above this become white.
    pub white_threshold: u8,
    /// Contrast adjustment in percent, `-100..=100`.
    pub contrast: i8,
    /// Brightness adjustment in percent, `-100..=100`.
    pub brightness: i8,
    /// Swap lit and dark pixels after conversion.
    pub invert: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            dither: false,
            black_threshold: 64,
            white_threshold: 192,
            contrast: 0,
            brightness: 0,
            invert: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Text rendered onto a display when no (or alongside an) icon.
pub struct TextSettings {
    /// UTF-8 text; `\n` starts a new line.
    pub text: String,
    /// `"<N>px <family>"` or a bare family name; empty selects the default sans-serif.
    pub font: String,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Layout of an icon next to text.
pub struct TextWithIconSettings {
    /// Icon area width as a multiple of the tile height.
    pub icon_width_multiplier: f32,
}

impl Default for TextWithIconSettings {
    fn default() -> Self {
        Self {
            icon_width_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "DisplayRecord", into = "DisplayRecord")]
/// Visual content of one tile display.
///
/// `converted_image` and `preview` are derived caches. The editor regenerates them through the
/// image pipeline whenever the source or settings change; deserialization re-derives the preview.
pub struct Display {
    /// Conversion settings.
    pub image_settings: ImageSettings,
    /// Text content.
    pub text_settings: TextSettings,
    /// Icon plus text layout.
    pub text_with_icon_settings: TextWithIconSettings,
    /// Whether this display is a value copy of the default-back template.
    pub is_generated_from_default_back_image: bool,
    /// Page of the button that was auto-wired to navigate to this display's page.
    pub previous_page: Option<usize>,
    /// Button index of that auto-wired button.
    pub previous_display: Option<usize>,
    /// Encoded source image (raster or SVG), if any.
    pub original_image: Option<Vec<u8>>,
    converted_image: Vec<u8>,
    preview: Preview,
}

impl Default for Display {
    fn default() -> Self {
        Self::from(DisplayRecord::default())
    }
}

impl Display {
    /// Packed device bitmap (`TILE_BYTES` long).
    pub fn converted_image(&self) -> &[u8] {
        &self.converted_image
    }

    /// Renderable preview derived from [`Self::converted_image`].
    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Replace the derived bitmap and re-derive the preview.
    pub(crate) fn set_converted_image(&mut self, bitmap: Vec<u8>) {
        self.preview = preview_from(&bitmap);
        self.converted_image = bitmap;
    }

    /// Whether any text is set.
    pub fn has_text(&self) -> bool {
        !self.text_settings.text.trim().is_empty()
    }

    /// Value copy of a default-back `template` for a slot with the given back-link bookkeeping.
    pub fn back_copy(
        template: &Display,
        previous_page: Option<usize>,
        previous_display: Option<usize>,
    ) -> Self {
        Self {
            is_generated_from_default_back_image: true,
            previous_page,
            previous_display,
            ..template.clone()
        }
    }

    /// Copy of `self` with the derived caches replaced by `bitmap`.
    pub(crate) fn with_converted_image(mut self, bitmap: Vec<u8>) -> Self {
        self.set_converted_image(bitmap);
        self
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisplayRecord {
    #[serde(default)]
    image_settings: ImageSettings,
    #[serde(default)]
    text_settings: TextSettings,
    #[serde(default)]
    text_with_icon_settings: TextWithIconSettings,
    #[serde(default)]
    is_generated_from_default_back_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_display: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_image: Option<Vec<u8>>,
    #[serde(default = "blank_bitmap")]
    converted_image: Vec<u8>,
}

impl Default for DisplayRecord {
    fn default() -> Self {
        Self {
            image_settings: ImageSettings::default(),
            text_settings: TextSettings::default(),
            text_with_icon_settings: TextWithIconSettings::default(),
            is_generated_from_default_back_image: false,
            previous_page: None,
            previous_display: None,
            original_image: None,
            converted_image: blank_bitmap(),
        }
    }
}

fn blank_bitmap() -> Vec<u8> {
    vec![0u8; TILE_BYTES]
}

impl From<DisplayRecord> for Display {
    fn from(r: DisplayRecord) -> Self {
        Self {
            image_settings: r.image_settings,
            text_settings: r.text_settings,
            text_with_icon_settings: r.text_with_icon_settings,
            is_generated_from_default_back_image: r.is_generated_from_default_back_image,
            previous_page: r.previous_page,
            previous_display: r.previous_display,
            original_image: r.original_image,
            preview: preview_from(&r.converted_image),
            converted_image: r.converted_image,
        }
    }
}

impl From<Display> for DisplayRecord {
    fn from(d: Display) -> Self {
        Self {
            image_settings: d.image_settings,
            text_settings: d.text_settings,
            text_with_icon_settings: d.text_with_icon_settings,
            is_generated_from_default_back_image: d.is_generated_from_default_back_image,
            previous_page: d.previous_page,
            previous_display: d.previous_display,
            original_image: d.original_image,
            converted_image: d.converted_image,
        }
    }
}
