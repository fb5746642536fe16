use crate::{
    codec::layout::{HEADER_LEN, Header, Reader, read_action, read_settings},
    foundation::core::TILE_BYTES,
    foundation::error::{DeckError, DeckResult},
    model::action::ButtonSetting,
    model::display::Display,
    model::document::{ConfigDocument, Page},
};

#[tracing::instrument(skip(buf), fields(bytes = buf.len()))]
/// Parse a device configuration buffer into a new document.
///
/// Bitmaps are copied verbatim; no source images are recovered. Any malformed section fails the
/// whole decode with [`DeckError::Format`].
pub fn decode_document(buf: &[u8]) -> DeckResult<ConfigDocument> {
    let header = Header::read(buf)?;
    let needed = header.min_buffer_len().unwrap_or(usize::MAX);
    if buf.len() < needed {
        return Err(DeckError::format(format!(
            "buffer is {} bytes, the declared {} pages of {}x{} tiles need at least {needed}",
            buf.len(),
            header.page_count,
            header.width,
            header.height
        )));
    }
    let slots = header.slots();
    let mut r = Reader::at(buf, HEADER_LEN);

    let mut buttons = Vec::with_capacity(slots);
    for _ in 0..slots {
        let primary = read_action(&mut r)?;
        let secondary = read_action(&mut r)?;
        buttons.push(ButtonSetting { primary, secondary });
    }

    let mut bitmaps = Vec::with_capacity(slots);
    for _ in 0..slots {
        bitmaps.push(r.take(TILE_BYTES, "image body")?);
    }

    let template = read_settings(&mut r, "footer")?;
    let default_back_display = template.with_converted_image(r.take(TILE_BYTES, "footer")?.to_vec());

    let settings: Vec<Display> = if header.version.has_settings_extension() {
        let count = r.u32("settings extension")?;
        if usize::try_from(count).ok() != Some(slots) {
            return Err(DeckError::format(format!(
                "settings extension holds {count} records for {slots} displays"
            )));
        }
        (0..slots)
            .map(|_| read_settings(&mut r, "settings extension"))
            .collect::<DeckResult<_>>()?
    } else {
        vec![Display::default(); slots]
    };

    if r.remaining() != 0 {
        return Err(DeckError::format(format!(
            "{} trailing bytes after offset {}",
            r.remaining(),
            r.position()
        )));
    }

    let mut displays = settings
        .into_iter()
        .zip(bitmaps)
        .map(|(display, bitmap)| display.with_converted_image(bitmap.to_vec()));
    let mut buttons = buttons.into_iter();
    let pages = (0..header.page_count)
        .map(|_| Page {
            buttons: buttons.by_ref().take(header.tiles()).collect(),
            displays: displays.by_ref().take(header.tiles()).collect(),
        })
        .collect();

    let doc = ConfigDocument {
        format_version: header.version,
        brightness: header.brightness,
        tile_grid_width: header.width,
        tile_grid_height: header.height,
        pages,
        default_back_display,
    };
    doc.validate()
        .map_err(|e| DeckError::format(format!("decoded document is inconsistent: {e}")))?;

    tracing::debug!(pages = doc.pages.len(), "configuration decoded");
    Ok(doc)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/decode.rs"]
mod tests;
