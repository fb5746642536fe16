use crate::{
    foundation::core::{FormatVersion, MAX_GRID_DIM, SlotRef, TILE_BYTES},
    foundation::error::{DeckError, DeckResult},
    model::action::{ActionSlot, ButtonSetting},
    model::display::Display,
};

/// Grid width of a fresh document.
pub const DEFAULT_GRID_WIDTH: u8 = 3;
/// Grid height of a fresh document.
pub const DEFAULT_GRID_HEIGHT: u8 = 2;
/// Device brightness of a fresh document.
pub const DEFAULT_BRIGHTNESS: u8 = 200;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// One grid's worth of buttons and displays; both vectors are indexed by row-major tile index.
pub struct Page {
    /// Button bindings.
    pub buttons: Vec<ButtonSetting>,
    /// Tile displays.
    pub displays: Vec<Display>,
}

impl Page {
    /// Page of `tiles` default buttons and blank displays.
    pub fn with_tiles(tiles: usize) -> Self {
        Self {
            buttons: vec![ButtonSetting::default(); tiles],
            displays: vec![Display::default(); tiles],
        }
    }

    /// Number of tiles on this page, if buttons and displays agree.
    pub fn tile_count(&self) -> Option<usize> {
        (self.buttons.len() == self.displays.len()).then_some(self.buttons.len())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Root of the editable configuration.
pub struct ConfigDocument {
    /// Binary format version this document is written as.
    pub format_version: FormatVersion,
    /// Display brightness sent to the device.
    pub brightness: u8,
    /// Tiles per row.
    pub tile_grid_width: u8,
    /// Tile rows.
    pub tile_grid_height: u8,
    /// Pages in device order.
    pub pages: Vec<Page>,
    /// Template copied by value into back-navigation displays.
    pub default_back_display: Display,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::new(Display::default())
    }
}

impl ConfigDocument {
    /// Empty document (no pages) with the default grid and the given back template.
    pub fn new(default_back_display: Display) -> Self {
        Self {
            format_version: FormatVersion::CURRENT,
            brightness: DEFAULT_BRIGHTNESS,
            tile_grid_width: DEFAULT_GRID_WIDTH,
            tile_grid_height: DEFAULT_GRID_HEIGHT,
            pages: Vec::new(),
            default_back_display,
        }
    }

    /// Tiles per page implied by the grid size.
    pub fn tile_count(&self) -> usize {
        usize::from(self.tile_grid_width) * usize::from(self.tile_grid_height)
    }

    /// Whether `slot` addresses an existing tile.
    pub fn contains(&self, slot: SlotRef) -> bool {
        self.pages
            .get(slot.page)
            .is_some_and(|p| slot.button < p.buttons.len() && slot.button < p.displays.len())
    }

    /// Button binding at `slot`.
    pub fn button(&self, slot: SlotRef) -> Option<&ButtonSetting> {
        self.pages.get(slot.page)?.buttons.get(slot.button)
    }

    /// Display at `slot`.
    pub fn display(&self, slot: SlotRef) -> Option<&Display> {
        self.pages.get(slot.page)?.displays.get(slot.button)
    }

    /// Iterate all button bindings with their coordinates, in page then tile order.
    pub fn buttons(&self) -> impl Iterator<Item = (SlotRef, &ButtonSetting)> {
        self.pages.iter().enumerate().flat_map(|(p, page)| {
            page.buttons
                .iter()
                .enumerate()
                .map(move |(b, button)| (SlotRef::new(p, b), button))
        })
    }

    /// Iterate all displays with their coordinates, in page then tile order.
    pub fn displays(&self) -> impl Iterator<Item = (SlotRef, &Display)> {
        self.pages.iter().enumerate().flat_map(|(p, page)| {
            page.displays
                .iter()
                .enumerate()
                .map(move |(b, display)| (SlotRef::new(p, b), display))
        })
    }

    /// Check every structural and cross-entity invariant; an empty list means valid.
    pub fn check_invariants(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        for (name, dim) in [
            ("width", self.tile_grid_width),
            ("height", self.tile_grid_height),
        ] {
            if dim == 0 || dim > MAX_GRID_DIM {
                out.push(Violation::GridDimension { name, value: dim });
            }
        }

        if self.pages.len() > usize::from(u16::MAX) {
            out.push(Violation::TooManyPages {
                count: self.pages.len(),
            });
        }

        let tiles = self.tile_count();
        for (index, page) in self.pages.iter().enumerate() {
            if page.buttons.len() != tiles || page.displays.len() != tiles {
                out.push(Violation::PageShape {
                    page: index,
                    buttons: page.buttons.len(),
                    displays: page.displays.len(),
                    expected: tiles,
                });
            }
        }

        for (slot, button) in self.buttons() {
            for (which, action) in [
                (ActionSlot::Primary, &button.primary),
                (ActionSlot::Secondary, &button.secondary),
            ] {
                if let Err(err) = action.kind.validate() {
                    out.push(Violation::ActionPayload {
                        slot,
                        which,
                        message: err.to_string(),
                    });
                }
                if let Some(target) = action.change_page_target()
                    && usize::from(target) >= self.pages.len()
                {
                    out.push(Violation::DanglingPageTarget {
                        slot,
                        which,
                        target,
                        pages: self.pages.len(),
                    });
                }
            }
        }

        for (slot, display) in self.displays() {
            if display.converted_image().len() != TILE_BYTES {
                out.push(Violation::BitmapSize {
                    slot: Some(slot),
                    len: display.converted_image().len(),
                });
            }
        }
        if self.default_back_display.converted_image().len() != TILE_BYTES {
            out.push(Violation::BitmapSize {
                slot: None,
                len: self.default_back_display.converted_image().len(),
            });
        }

        out
    }

    /// [`Self::check_invariants`] plus a supported format version, as a single error.
    pub fn validate(&self) -> DeckResult<()> {
        if !self.format_version.is_supported() {
            return Err(DeckError::validation(format!(
                "format version {} is not supported",
                self.format_version
            )));
        }
        let violations = self.check_invariants();
        if violations.is_empty() {
            return Ok(());
        }
        Err(DeckError::validation(
            violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
/// One broken document invariant.
pub enum Violation {
    /// Grid width or height outside `1..=MAX_GRID_DIM`.
    #[error("grid {name} {value} is outside 1..=16")]
    GridDimension {
        /// `"width"` or `"height"`.
        name: &'static str,
        /// Offending value.
        value: u8,
    },
    /// More pages than the wire format can count.
    #[error("{count} pages exceed the format limit")]
    TooManyPages {
        /// Page count.
        count: usize,
    },
    /// Page whose button or display count differs from the grid tile count.
    #[error("page {page} has {buttons} buttons and {displays} displays, expected {expected}")]
    PageShape {
        /// Page index.
        page: usize,
        /// Buttons on the page.
        buttons: usize,
        /// Displays on the page.
        displays: usize,
        /// Grid tile count.
        expected: usize,
    },
    /// Action payload outside its kind's arity bounds.
    #[error("{slot} {which:?} action: {message}")]
    ActionPayload {
        /// Button coordinates.
        slot: SlotRef,
        /// Primary or secondary.
        which: ActionSlot,
        /// Validation message.
        message: String,
    },
    /// Change-page action pointing past the last page.
    #[error("{slot} {which:?} action targets page {target} but only {pages} exist")]
    DanglingPageTarget {
        /// Button coordinates.
        slot: SlotRef,
        /// Primary or secondary.
        which: ActionSlot,
        /// Target page index.
        target: u16,
        /// Page count.
        pages: usize,
    },
    /// Converted bitmap of the wrong length (`slot` is `None` for the back template).
    #[error("display {slot:?} bitmap is {len} bytes")]
    BitmapSize {
        /// Display coordinates, or `None` for the template.
        slot: Option<SlotRef>,
        /// Actual byte length.
        len: usize,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/model/document.rs"]
mod tests;
