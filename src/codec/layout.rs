//! Byte layout shared by the encoder and decoder.
//!
//! ```text
//! Header      16 bytes
//! ButtonBody  pages * tiles * 32 bytes (primary action, secondary action)
//! ImageBody   pages * tiles * 1024 bytes
//! Footer      template settings record, template bitmap
//! Extension   u32 record count, one settings record per display (format minor >= 1)
//! ```
//!
//! All integers are little-endian.

use crate::{
    foundation::core::{FormatVersion, MAX_GRID_DIM, TILE_BYTES},
    foundation::error::{DeckError, DeckResult},
    model::action::{Action, MAX_ACTION_VALUES},
    model::display::{Display, ImageSettings, TextSettings, TextWithIconSettings},
};

/// Header length in bytes.
pub const HEADER_LEN: usize = 16;
/// Encoded length of one action.
pub const ACTION_LEN: usize = 16;
/// Encoded length of one button (primary then secondary action).
pub const BUTTON_LEN: usize = 2 * ACTION_LEN;
/// Fixed-size part of a settings record, before the two strings.
pub const SETTINGS_FIXED_LEN: usize = 14;
/// Smallest settings record: fixed part plus two empty length-prefixed strings.
pub const SETTINGS_MIN_LEN: usize = SETTINGS_FIXED_LEN + 2 * 2;

const ACTION_FLAG_ENABLED: u8 = 0x01;

const SETTINGS_FLAG_DITHER: u8 = 0x01;
const SETTINGS_FLAG_INVERT: u8 = 0x02;
const SETTINGS_FLAG_DEFAULT_BACK: u8 = 0x04;
const SETTINGS_FLAG_PREVIOUS_PAGE: u8 = 0x08;
const SETTINGS_FLAG_PREVIOUS_DISPLAY: u8 = 0x10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Decoded fixed-size header.
pub struct Header {
    /// Format version of the buffer.
    pub version: FormatVersion,
    /// Tiles per row.
    pub width: u8,
    /// Tile rows.
    pub height: u8,
    /// Device brightness.
    pub brightness: u8,
    /// Number of pages.
    pub page_count: u16,
    /// Absolute offset of the image body.
    pub image_offset: u32,
}

impl Header {
    /// Tiles per page.
    pub fn tiles(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Displays (and buttons) across all pages.
    pub fn slots(&self) -> usize {
        usize::from(self.page_count) * self.tiles()
    }

    /// Offset at which the image body starts for this shape.
    pub fn expected_image_offset(&self) -> usize {
        HEADER_LEN + self.slots() * BUTTON_LEN
    }

    /// Smallest buffer that can hold every section this header declares, or `None` when the
    /// shape overflows `usize`.
    pub fn min_buffer_len(&self) -> Option<usize> {
        let slots = self.slots();
        let mut len = self
            .expected_image_offset()
            .checked_add(slots.checked_mul(TILE_BYTES)?)?
            .checked_add(SETTINGS_MIN_LEN + TILE_BYTES)?;
        if self.version.has_settings_extension() {
            len = len
                .checked_add(4)?
                .checked_add(slots.checked_mul(SETTINGS_MIN_LEN)?)?;
        }
        Some(len)
    }

    /// Serialize into `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[
            self.version.major,
            self.version.minor,
            self.version.patch,
            self.width,
            self.height,
            self.brightness,
        ]);
        out.extend_from_slice(&self.page_count.to_le_bytes());
        out.extend_from_slice(&self.image_offset.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
    }

    /// Parse and check the header at the start of `buf`.
    pub fn read(buf: &[u8]) -> DeckResult<Self> {
        let mut r = Reader::new(buf);
        let raw = r.take(HEADER_LEN, "header")?;
        let version = FormatVersion::new(raw[0], raw[1], raw[2]);
        if !version.is_supported() {
            return Err(DeckError::format(format!(
                "unsupported format version {version}"
            )));
        }
        let header = Self {
            version,
            width: raw[3],
            height: raw[4],
            brightness: raw[5],
            page_count: u16::from_le_bytes([raw[6], raw[7]]),
            image_offset: u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]),
        };
        for (name, dim) in [("width", header.width), ("height", header.height)] {
            if dim == 0 || dim > MAX_GRID_DIM {
                return Err(DeckError::format(format!(
                    "grid {name} {dim} is outside 1..={MAX_GRID_DIM}"
                )));
            }
        }
        if usize::try_from(header.image_offset).ok() != Some(header.expected_image_offset()) {
            return Err(DeckError::format(format!(
                "image body offset {} does not match the {} declared buttons (expected {})",
                header.image_offset,
                header.slots(),
                header.expected_image_offset()
            )));
        }
        Ok(header)
    }
}

/// Bounds-checked little-endian cursor over a buffer.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Cursor at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Cursor at `pos`.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Current offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Consume `n` bytes; `what` names the section in the error.
    pub fn take(&mut self, n: usize, what: &str) -> DeckResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                DeckError::format(format!(
                    "buffer ends inside the {what}: need {n} bytes at offset {}, have {}",
                    self.pos,
                    self.remaining()
                ))
            })?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u16(&mut self, what: &str) -> DeckResult<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Consume a little-endian `u32`.
    pub fn u32(&mut self, what: &str) -> DeckResult<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn string(&mut self, what: &str) -> DeckResult<String> {
        let len = usize::from(self.u16(what)?);
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| DeckError::format(format!("{what} is not UTF-8: {e}")))
    }
}

/// Append one action record.
pub fn write_action(out: &mut Vec<u8>, action: &Action) -> DeckResult<()> {
    let values = action.values();
    if values.len() > MAX_ACTION_VALUES {
        return Err(DeckError::validation(format!(
            "action carries {} values, the format holds {MAX_ACTION_VALUES}",
            values.len()
        )));
    }
    let flags = if action.enabled {
        ACTION_FLAG_ENABLED
    } else {
        0
    };
    out.extend_from_slice(&[action.mode().tag(), flags, values.len() as u8, 0]);
    for i in 0..MAX_ACTION_VALUES {
        out.extend_from_slice(&values.get(i).copied().unwrap_or(0).to_le_bytes());
    }
    Ok(())
}

/// Consume one action record.
pub fn read_action(r: &mut Reader<'_>) -> DeckResult<Action> {
    let offset = r.position();
    let raw = r.take(ACTION_LEN, "button body")?;
    let (tag, flags, count) = (raw[0], raw[1], usize::from(raw[2]));
    if count > MAX_ACTION_VALUES {
        return Err(DeckError::format(format!(
            "action at offset {offset} declares {count} values"
        )));
    }
    let values: Vec<u16> = raw[4..]
        .chunks_exact(2)
        .take(count)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();
    Action::from_raw(tag, &values, flags & ACTION_FLAG_ENABLED != 0)
        .map_err(|e| DeckError::format(format!("action at offset {offset}: {e}")))
}

/// Append the settings record of `display` (everything but its bitmap and source).
pub fn write_settings(out: &mut Vec<u8>, display: &Display) -> DeckResult<()> {
    let s = &display.image_settings;
    let mut flags = 0u8;
    for (set, bit) in [
        (s.dither, SETTINGS_FLAG_DITHER),
        (s.invert, SETTINGS_FLAG_INVERT),
        (
            display.is_generated_from_default_back_image,
            SETTINGS_FLAG_DEFAULT_BACK,
        ),
        (display.previous_page.is_some(), SETTINGS_FLAG_PREVIOUS_PAGE),
        (
            display.previous_display.is_some(),
            SETTINGS_FLAG_PREVIOUS_DISPLAY,
        ),
    ] {
        if set {
            flags |= bit;
        }
    }

    out.extend_from_slice(&[
        flags,
        s.black_threshold,
        s.white_threshold,
        s.contrast.to_le_bytes()[0],
        s.brightness.to_le_bytes()[0],
        0,
    ]);
    out.extend_from_slice(&index_u16(display.previous_page, "previous page")?.to_le_bytes());
    out.extend_from_slice(&index_u16(display.previous_display, "previous display")?.to_le_bytes());
    out.extend_from_slice(
        &display
            .text_with_icon_settings
            .icon_width_multiplier
            .to_bits()
            .to_le_bytes(),
    );
    write_string(out, &display.text_settings.text, "text")?;
    write_string(out, &display.text_settings.font, "font")?;
    Ok(())
}

/// Consume a settings record and return a display carrying it (blank bitmap, no source).
pub fn read_settings(r: &mut Reader<'_>, what: &str) -> DeckResult<Display> {
    let fixed = r.take(SETTINGS_FIXED_LEN, what)?;
    let flags = fixed[0];
    let has = |bit: u8| flags & bit != 0;
    let previous_page = u16::from_le_bytes([fixed[6], fixed[7]]);
    let previous_display = u16::from_le_bytes([fixed[8], fixed[9]]);
    let multiplier = f32::from_bits(u32::from_le_bytes([
        fixed[10], fixed[11], fixed[12], fixed[13],
    ]));
    let text = r.string(what)?;
    let font = r.string(what)?;

    let mut display = Display::default();
    display.image_settings = ImageSettings {
        dither: has(SETTINGS_FLAG_DITHER),
        black_threshold: fixed[1],
        white_threshold: fixed[2],
        contrast: i8::from_le_bytes([fixed[3]]),
        brightness: i8::from_le_bytes([fixed[4]]),
        invert: has(SETTINGS_FLAG_INVERT),
    };
    display.text_settings = TextSettings { text, font };
    display.text_with_icon_settings = TextWithIconSettings {
        icon_width_multiplier: multiplier,
    };
    display.is_generated_from_default_back_image = has(SETTINGS_FLAG_DEFAULT_BACK);
    display.previous_page = has(SETTINGS_FLAG_PREVIOUS_PAGE).then_some(usize::from(previous_page));
    display.previous_display =
        has(SETTINGS_FLAG_PREVIOUS_DISPLAY).then_some(usize::from(previous_display));
    Ok(display)
}

/// Check that a bitmap has the packed tile size.
pub fn check_bitmap(bitmap: &[u8], what: &str) -> DeckResult<()> {
    if bitmap.len() != TILE_BYTES {
        return Err(DeckError::validation(format!(
            "{what} bitmap is {} bytes, expected {TILE_BYTES}",
            bitmap.len()
        )));
    }
    Ok(())
}

fn index_u16(index: Option<usize>, what: &str) -> DeckResult<u16> {
    let index = index.unwrap_or(0);
    u16::try_from(index)
        .map_err(|_| DeckError::validation(format!("{what} {index} exceeds the format limit")))
}

fn write_string(out: &mut Vec<u8>, s: &str, what: &str) -> DeckResult<()> {
    let len = u16::try_from(s.len()).map_err(|_| {
        DeckError::validation(format!("{what} is {} bytes, the format holds 65535", s.len()))
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(s.as_bytes());
    Ok(())
}
