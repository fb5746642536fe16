//! deckcfg is the document compiler behind a configurator for programmable button panels.
//!
//! A panel is a grid of physical buttons, each paired with a 128x64 monochrome display. A
//! configuration is a list of pages; every page binds two actions to each button and a bitmap
//! to each display. deckcfg edits that configuration and compiles it into the binary layout the
//! panel firmware reads, and it can parse such a binary back for re-editing.
//!
//! # Pieces
//!
//! 1. **Document** (`ConfigDocument`): pages, buttons, displays and the shared default-back
//!    template, plus `check_invariants`.
//! 2. **Editor**: the single owner of the live document. Every edit is a [`Command`] applied
//!    atomically; displays whose content changes are re-rendered before commit.
//! 3. **Image pipeline** (`ImagePipeline`): source image or text plus settings to packed bitmap.
//!    Pure and deterministic for a given font database.
//! 4. **Codec** (`encode_document` / `decode_document`): the device binary format.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **All-or-nothing edits and decodes**: a failed command or decode never touches the live
//!   document.
//! - **No IO in the core**: persistence and the device link are injected ([`TemplateStore`],
//!   [`Transport`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
mod edit;
mod foundation;
mod model;
mod raster;

pub use codec::decode::decode_document;
pub use codec::encode::encode_document;
pub use codec::layout::{ACTION_LEN, BUTTON_LEN, HEADER_LEN, Header};
pub use codec::page::{page_image_bytes, parse_page, tile_rows};
pub use edit::command::{Command, DisplayTarget};
pub use edit::engine::{Applied, Editor};
pub use edit::services::{
    ConfigSource, DEFAULT_BACK_DISPLAY_KEY, FileTemplateStore, MemoryTemplateStore, Notice,
    TemplateStore, Transport, read_source,
};
pub use foundation::core::{
    FormatVersion, MAX_GRID_DIM, SlotRef, TILE_BYTES, TILE_HEIGHT, TILE_ROW_BYTES, TILE_WIDTH,
};
pub use foundation::error::{DeckError, DeckResult};
pub use model::action::{
    Action, ActionKind, ActionMode, ActionSlot, ButtonSetting, MAX_ACTION_VALUES,
};
pub use model::display::{Display, ImageSettings, TextSettings, TextWithIconSettings};
pub use model::document::{
    ConfigDocument, DEFAULT_BRIGHTNESS, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, Page, Violation,
};
pub use raster::compose::{DEFAULT_BACK_SVG, ImagePipeline, icon_width};
pub use raster::fonts::{FontOptions, FontSpec};
pub use raster::mono::{bit_is_set, to_monochrome};
pub use raster::preview::{Preview, preview_from};
pub use raster::source::looks_like_svg;
