use crate::{
    codec::layout::Header,
    foundation::core::{TILE_BYTES, TILE_ROW_BYTES},
    foundation::error::{DeckError, DeckResult},
};

/// Slice the image body of page `page` out of an encoded configuration.
pub fn page_image_bytes(buf: &[u8], page: usize) -> DeckResult<&[u8]> {
    let header = Header::read(buf)?;
    if page >= usize::from(header.page_count) {
        return Err(DeckError::validation(format!(
            "page {page} of {} does not exist",
            header.page_count
        )));
    }
    let page_len = header.tiles() * TILE_BYTES;
    let start = header.expected_image_offset() + page * page_len;
    buf.get(start..start + page_len).ok_or_else(|| {
        DeckError::format(format!(
            "buffer ends inside the image body of page {page}"
        ))
    })
}

/// Split one page's image body into per-tile bitmaps, in tile order.
pub fn parse_page(bytes: &[u8]) -> DeckResult<Vec<&[u8]>> {
    if bytes.len() % TILE_BYTES != 0 {
        return Err(DeckError::format(format!(
            "page image body is {} bytes, not a multiple of {TILE_BYTES}",
            bytes.len()
        )));
    }
    Ok(bytes.chunks_exact(TILE_BYTES).collect())
}

/// Split one tile bitmap into its packed rows, top to bottom.
pub fn tile_rows(tile: &[u8]) -> DeckResult<std::slice::ChunksExact<'_, u8>> {
    if tile.len() != TILE_BYTES {
        return Err(DeckError::format(format!(
            "tile bitmap is {} bytes, expected {TILE_BYTES}",
            tile.len()
        )));
    }
    Ok(tile.chunks_exact(TILE_ROW_BYTES))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/page.rs"]
mod tests;
