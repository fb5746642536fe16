use crate::{
    foundation::core::SlotRef,
    foundation::error::{DeckError, DeckResult},
    model::action::{Action, ActionSlot},
    model::display::Display,
    model::document::ConfigDocument,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
/// Display addressed by a settings edit.
pub enum DisplayTarget {
    /// The shared default-back template.
    DefaultBack,
    /// A display on a page.
    Slot(SlotRef),
}

impl DisplayTarget {
    /// Map a `(page, button)` index pair to a target; `(-1, -1)` selects the template.
    pub fn from_indices(page: i64, button: i64) -> DeckResult<Self> {
        if page == -1 && button == -1 {
            return Ok(Self::DefaultBack);
        }
        let page = usize::try_from(page)
            .map_err(|_| DeckError::validation(format!("page index {page} is out of range")))?;
        let button = usize::try_from(button)
            .map_err(|_| DeckError::validation(format!("button index {button} is out of range")))?;
        Ok(Self::Slot(SlotRef::new(page, button)))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// Closed set of document edits accepted by [`crate::Editor::apply`].
pub enum Command {
    /// Replace the device brightness.
    SetBrightness {
        /// New brightness.
        brightness: u8,
    },
    /// Resize the grid. Shrinking drops the trailing tiles of every page for good.
    SetDimensions {
        /// New tiles per row, if changing.
        width: Option<u8>,
        /// New tile rows, if changing.
        height: Option<u8>,
    },
    /// Append a page, optionally wired to and from an existing button.
    AddPage {
        /// Button that should navigate to the new page.
        back_link: Option<SlotRef>,
    },
    /// Remove a page and renumber change-page targets behind it.
    DeletePage {
        /// Page index.
        page: usize,
    },
    /// Replace one action of one button.
    SetButtonSettings {
        /// Button coordinates.
        slot: SlotRef,
        /// Primary or secondary.
        which: ActionSlot,
        /// New action.
        action: Action,
    },
    /// Replace a display's settings and re-render it.
    SetDisplaySettings {
        /// Page display or the default-back template.
        target: DisplayTarget,
        /// New settings; its derived bitmap is ignored and regenerated.
        display: Box<Display>,
    },
    /// Attach or clear the source image of a display and re-render it.
    SetOriginalImage {
        /// Display coordinates.
        slot: SlotRef,
        /// Encoded raster or SVG bytes; `None` clears the source.
        image: Option<Vec<u8>>,
    },
    /// Reset a display to its blank default.
    DeleteImage {
        /// Display coordinates.
        slot: SlotRef,
    },
    /// Swap the button and display at two coordinates.
    SwitchButtons {
        /// First slot.
        a: SlotRef,
        /// Second slot.
        b: SlotRef,
    },
    /// Copy a new template into every display generated from the old one.
    UpdateAllDefaultBackImages {
        /// Replacement template.
        display: Box<Display>,
    },
    /// Copy the current template into a slot and mark it as generated from it.
    MakeDefaultBackButton {
        /// Display coordinates.
        slot: SlotRef,
    },
    /// Replace the whole document.
    SetState {
        /// Incoming document, validated before it is committed.
        document: Box<ConfigDocument>,
    },
}

impl Command {
    /// Short operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetBrightness { .. } => "set_brightness",
            Self::SetDimensions { .. } => "set_dimensions",
            Self::AddPage { .. } => "add_page",
            Self::DeletePage { .. } => "delete_page",
            Self::SetButtonSettings { .. } => "set_button_settings",
            Self::SetDisplaySettings { .. } => "set_display_settings",
            Self::SetOriginalImage { .. } => "set_original_image",
            Self::DeleteImage { .. } => "delete_image",
            Self::SwitchButtons { .. } => "switch_buttons",
            Self::UpdateAllDefaultBackImages { .. } => "update_all_default_back_images",
            Self::MakeDefaultBackButton { .. } => "make_default_back_button",
            Self::SetState { .. } => "set_state",
        }
    }
}
