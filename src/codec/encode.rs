use crate::{
    codec::layout::{
        BUTTON_LEN, HEADER_LEN, Header, check_bitmap, write_action, write_settings,
    },
    foundation::core::TILE_BYTES,
    foundation::error::{DeckError, DeckResult},
    model::document::ConfigDocument,
};

#[tracing::instrument(skip(doc), fields(pages = doc.pages.len()))]
/// Serialize a valid document into the device configuration format.
///
/// Source images and previews are not part of the format; bitmaps are written as stored.
pub fn encode_document(doc: &ConfigDocument) -> DeckResult<Vec<u8>> {
    doc.validate()?;

    let page_count = u16::try_from(doc.pages.len())
        .map_err(|_| DeckError::validation("too many pages for the format"))?;
    let slots = doc.pages.len() * doc.tile_count();
    let image_offset = HEADER_LEN + slots * BUTTON_LEN;
    let header = Header {
        version: doc.format_version,
        width: doc.tile_grid_width,
        height: doc.tile_grid_height,
        brightness: doc.brightness,
        page_count,
        image_offset: u32::try_from(image_offset)
            .map_err(|_| DeckError::validation("button body exceeds the format limit"))?,
    };

    let mut out = Vec::with_capacity(image_offset + (slots + 1) * (TILE_BYTES + 32));
    header.write(&mut out);

    for (_, button) in doc.buttons() {
        for action in button.actions() {
            write_action(&mut out, action)?;
        }
    }
    for (slot, display) in doc.displays() {
        check_bitmap(display.converted_image(), &slot.to_string())?;
        out.extend_from_slice(display.converted_image());
    }

    let template = &doc.default_back_display;
    check_bitmap(template.converted_image(), "default back")?;
    write_settings(&mut out, template)?;
    out.extend_from_slice(template.converted_image());

    if doc.format_version.has_settings_extension() {
        let count = u32::try_from(slots)
            .map_err(|_| DeckError::validation("too many displays for the format"))?;
        out.extend_from_slice(&count.to_le_bytes());
        for (_, display) in doc.displays() {
            write_settings(&mut out, display)?;
        }
    }

    tracing::debug!(bytes = out.len(), "configuration encoded");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/encode.rs"]
mod tests;
