use std::{path::Path, sync::Arc};

#[derive(Clone, Debug, Default)]
/// Where the pipeline looks for fonts used by text displays and SVG `<text>`.
pub struct FontOptions {
    /// Load the fonts installed on this machine.
    pub system_fonts: bool,
    /// Extra directories scanned (non-recursively) for `.ttf`, `.otf` and `.ttc` files.
    pub font_dirs: Vec<std::path::PathBuf>,
}

impl FontOptions {
    /// System fonts plus no extra directories.
    pub fn system() -> Self {
        Self {
            system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

pub(crate) fn build_usvg_options(fonts: &FontOptions) -> usvg::Options<'static> {
    usvg::Options {
        fontdb: build_fontdb(fonts),
        font_resolver: make_font_resolver(),
        ..Default::default()
    }
}

fn build_fontdb(fonts: &FontOptions) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    if fonts.system_fonts {
        db.load_system_fonts();
    }
    for dir in &fonts.font_dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(err) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), %err, "skipping unreadable font");
        }
    }
}

// Named family, then generic families, then any installed face.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Monospace);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: fontdb_stretch(font.stretch()),
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

fn fontdb_stretch(stretch: usvg::FontStretch) -> usvg::fontdb::Stretch {
    use usvg::{FontStretch as S, fontdb::Stretch as D};
    match stretch {
        S::UltraCondensed => D::UltraCondensed,
        S::ExtraCondensed => D::ExtraCondensed,
        S::Condensed => D::Condensed,
        S::SemiCondensed => D::SemiCondensed,
        S::Normal => D::Normal,
        S::SemiExpanded => D::SemiExpanded,
        S::Expanded => D::Expanded,
        S::ExtraExpanded => D::ExtraExpanded,
        S::UltraExpanded => D::UltraExpanded,
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Parsed form of a display's `font` setting.
pub struct FontSpec {
    /// Requested size in pixels; `None` picks a size from the line count.
    pub size_px: Option<f32>,
    /// Family name; empty selects the default sans-serif.
    pub family: String,
}

impl FontSpec {
    /// Parse `"<N>px <family>"`, `"<N>px"` or a bare family name.
    pub fn parse(font: &str) -> Self {
        let font = font.trim();
        let (head, rest) = match font.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (font, ""),
        };
        let size_px = head
            .strip_suffix("px")
            .and_then(|n| n.parse::<f32>().ok())
            .filter(|n| n.is_finite() && *n > 0.0);
        match size_px {
            Some(size) => Self {
                size_px: Some(size),
                family: rest.to_string(),
            },
            None => Self {
                size_px: None,
                family: font.to_string(),
            },
        }
    }
}
