use crate::{
    foundation::core::{TILE_HEIGHT, TILE_WIDTH},
    foundation::error::{DeckError, DeckResult},
    raster::fonts::FontSpec,
};

const MAX_AUTO_SIZE_PX: f32 = 28.0;
const LINE_HEIGHT: f32 = 1.2;

/// Horizontal band of the tile that text (or an icon) is laid out in; always full height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    /// Left edge in pixels.
    pub x: u32,
    /// Width in pixels.
    pub width: u32,
}

impl Band {
    /// The whole tile.
    pub const FULL: Self = Self {
        x: 0,
        width: TILE_WIDTH,
    };
}

/// Rasterize `text` centered in `band`, returning tile-sized 8-bit coverage (row-major).
///
/// Text larger than the band is scaled down uniformly; it is never scaled up. Text that resolves
/// to no glyphs (blank, or no fonts installed) yields an all-zero buffer.
pub fn render_text(
    text: &str,
    font: &FontSpec,
    band: Band,
    opts: &usvg::Options<'_>,
) -> DeckResult<Vec<u8>> {
    let mut coverage = vec![0u8; (TILE_WIDTH * TILE_HEIGHT) as usize];

    let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() || band.width == 0 {
        return Ok(coverage);
    }

    let size = font.size_px.unwrap_or_else(|| {
        (TILE_HEIGHT as f32 / (lines.len() as f32 * LINE_HEIGHT)).min(MAX_AUTO_SIZE_PX)
    });
    let markup = text_markup(&lines, &font.family, size);
    let tree = usvg::Tree::from_str(&markup, opts)
        .map_err(|e| DeckError::image_decode(format!("lay out text: {e}")))?;

    let bbox = tree.root().abs_bounding_box();
    let (bw, bh) = (bbox.width(), bbox.height());
    if !tree.root().has_children() || !(bw.is_finite() && bh.is_finite() && bw > 0.0 && bh > 0.0)
    {
        return Ok(coverage);
    }

    let scale = 1.0f32
        .min(band.width as f32 / bw)
        .min(TILE_HEIGHT as f32 / bh);
    let tx = band.x as f32 + band.width as f32 / 2.0 - scale * (bbox.x() + bw / 2.0);
    let ty = TILE_HEIGHT as f32 / 2.0 - scale * (bbox.y() + bh / 2.0);
    let xform = resvg::tiny_skia::Transform::from_row(scale, 0.0, 0.0, scale, tx, ty);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(TILE_WIDTH, TILE_HEIGHT)
        .ok_or_else(|| DeckError::image_decode("failed to allocate text pixmap"))?;
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    let right = band.x.saturating_add(band.width).min(TILE_WIDTH);
    for (i, px) in pixmap.data().chunks_exact(4).enumerate() {
        let x = i as u32 % TILE_WIDTH;
        if x >= band.x && x < right {
            coverage[i] = px[3];
        }
    }
    Ok(coverage)
}

fn text_markup(lines: &[&str], family: &str, size: f32) -> String {
    let family = if family.trim().is_empty() {
        "sans-serif".to_string()
    } else {
        format!("{}, sans-serif", xml_escape(family.trim()))
    };

    let mut out = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{TILE_WIDTH}" height="{TILE_HEIGHT}"><text font-family="{family}" font-size="{size}" fill="#fff" text-anchor="middle" xml:space="preserve">"##
    );
    for (i, line) in lines.iter().enumerate() {
        let baseline = size + i as f32 * size * LINE_HEIGHT;
        out.push_str(&format!(
            r#"<tspan x="0" y="{baseline}">{}</tspan>"#,
            xml_escape(line)
        ));
    }
    out.push_str("</text></svg>");
    out
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
