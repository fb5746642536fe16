use crate::foundation::error::{DeckError, DeckResult};

/// Maximum number of `u16` values one action carries on the wire.
pub const MAX_ACTION_VALUES: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Wire-level action mode tag.
pub enum ActionMode {
    /// Button does nothing.
    Noop,
    /// Switch the device to another page.
    ChangePage,
    /// Press a key combination.
    Hotkey,
    /// Send a media / consumer-control key.
    Media,
    /// Type a short sequence of characters.
    Text,
    /// Change a firmware setting.
    Settings,
}

// Wire format values
const TAG_NOOP: u8 = 0;
const TAG_CHANGE_PAGE: u8 = 1;
const TAG_HOTKEY: u8 = 2;
const TAG_MEDIA: u8 = 3;
const TAG_TEXT: u8 = 4;
const TAG_SETTINGS: u8 = 5;

impl ActionMode {
    /// Parse a mode from its wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            TAG_NOOP => Some(Self::Noop),
            TAG_CHANGE_PAGE => Some(Self::ChangePage),
            TAG_HOTKEY => Some(Self::Hotkey),
            TAG_MEDIA => Some(Self::Media),
            TAG_TEXT => Some(Self::Text),
            TAG_SETTINGS => Some(Self::Settings),
            _ => None,
        }
    }

    /// Wire tag of this mode.
    pub fn tag(self) -> u8 {
        match self {
            Self::Noop => TAG_NOOP,
            Self::ChangePage => TAG_CHANGE_PAGE,
            Self::Hotkey => TAG_HOTKEY,
            Self::Media => TAG_MEDIA,
            Self::Text => TAG_TEXT,
            Self::Settings => TAG_SETTINGS,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
/// Behavior bound to a button press, with a payload shaped by its mode.
pub enum ActionKind {
    /// Button does nothing.
    #[default]
    Noop,
    /// Switch to page `page`.
    ChangePage {
        /// Target page index.
        page: u16,
    },
    /// Press all `keys` together (HID key codes).
    Hotkey {
        /// 1 to 6 HID key codes.
        keys: Vec<u8>,
    },
    /// Send one consumer-control code (play/pause, volume, ...).
    Media {
        /// Consumer-control usage code.
        code: u16,
    },
    /// Type `chars` one after another.
    Text {
        /// 1 to 6 character codes.
        chars: Vec<u16>,
    },
    /// Set firmware setting `setting` to `value`.
    Settings {
        /// Firmware setting identifier.
        setting: u16,
        /// New value.
        value: u16,
    },
}

impl ActionKind {
    /// Build a validated action kind from a mode and its raw value list.
    pub fn from_raw(mode: ActionMode, values: &[u16]) -> DeckResult<Self> {
        let kind = match mode {
            ActionMode::Noop => Self::Noop,
            ActionMode::ChangePage => match values {
                [page] => Self::ChangePage { page: *page },
                _ => {
                    return Err(DeckError::validation(format!(
                        "change-page action takes exactly 1 value, got {}",
                        values.len()
                    )));
                }
            },
            ActionMode::Hotkey => {
                let keys = values
                    .iter()
                    .map(|&v| {
                        u8::try_from(v).map_err(|_| {
                            DeckError::validation(format!("hotkey code {v} is out of range"))
                        })
                    })
                    .collect::<DeckResult<Vec<u8>>>()?;
                Self::Hotkey { keys }
            }
            ActionMode::Media => match values {
                [code] => Self::Media { code: *code },
                _ => {
                    return Err(DeckError::validation(format!(
                        "media action takes exactly 1 value, got {}",
                        values.len()
                    )));
                }
            },
            ActionMode::Text => Self::Text {
                chars: values.to_vec(),
            },
            ActionMode::Settings => match values {
                [setting, value] => Self::Settings {
                    setting: *setting,
                    value: *value,
                },
                _ => {
                    return Err(DeckError::validation(format!(
                        "settings action takes exactly 2 values, got {}",
                        values.len()
                    )));
                }
            },
        };
        kind.validate()?;
        Ok(kind)
    }

    /// Check payload arity bounds for list-valued kinds.
    pub fn validate(&self) -> DeckResult<()> {
        match self {
            Self::Hotkey { keys } => check_list_len("hotkey", keys.len()),
            Self::Text { chars } => check_list_len("text", chars.len()),
            Self::Noop | Self::ChangePage { .. } | Self::Media { .. } | Self::Settings { .. } => {
                Ok(())
            }
        }
    }

    /// Mode tag of this kind.
    pub fn mode(&self) -> ActionMode {
        match self {
            Self::Noop => ActionMode::Noop,
            Self::ChangePage { .. } => ActionMode::ChangePage,
            Self::Hotkey { .. } => ActionMode::Hotkey,
            Self::Media { .. } => ActionMode::Media,
            Self::Text { .. } => ActionMode::Text,
            Self::Settings { .. } => ActionMode::Settings,
        }
    }

    /// Raw value list as stored on the wire.
    pub fn values(&self) -> Vec<u16> {
        match self {
            Self::Noop => Vec::new(),
            Self::ChangePage { page } => vec![*page],
            Self::Hotkey { keys } => keys.iter().map(|&k| u16::from(k)).collect(),
            Self::Media { code } => vec![*code],
            Self::Text { chars } => chars.clone(),
            Self::Settings { setting, value } => vec![*setting, *value],
        }
    }
}

fn check_list_len(kind: &str, len: usize) -> DeckResult<()> {
    if len == 0 || len > MAX_ACTION_VALUES {
        return Err(DeckError::validation(format!(
            "{kind} action takes 1..={MAX_ACTION_VALUES} values, got {len}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One press binding: what it does and whether it is active.
pub struct Action {
    /// Mode plus mode-specific payload.
    pub kind: ActionKind,
    /// Disabled actions are kept but ignored by the firmware.
    pub enabled: bool,
}

impl Action {
    /// Build an enabled action.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            enabled: true,
        }
    }

    /// Build a disabled no-op action.
    pub fn disabled() -> Self {
        Self {
            kind: ActionKind::Noop,
            enabled: false,
        }
    }

    /// Enabled change-page action targeting `page`.
    pub fn change_page(page: u16) -> Self {
        Self::new(ActionKind::ChangePage { page })
    }

    /// Build a validated action from its wire representation.
    pub fn from_raw(tag: u8, values: &[u16], enabled: bool) -> DeckResult<Self> {
        let mode = ActionMode::from_tag(tag)
            .ok_or_else(|| DeckError::validation(format!("unknown action mode tag {tag}")))?;
        Ok(Self {
            kind: ActionKind::from_raw(mode, values)?,
            enabled,
        })
    }

    /// Mode tag of this action.
    pub fn mode(&self) -> ActionMode {
        self.kind.mode()
    }

    /// Raw value list of this action.
    pub fn values(&self) -> Vec<u16> {
        self.kind.values()
    }

    /// Target page when this is a change-page action.
    pub fn change_page_target(&self) -> Option<u16> {
        match self.kind {
            ActionKind::ChangePage { page } => Some(page),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which of a button's two actions an edit addresses.
pub enum ActionSlot {
    /// Short press.
    Primary,
    /// Long press.
    Secondary,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Primary and secondary action of one button.
pub struct ButtonSetting {
    /// Short-press action.
    pub primary: Action,
    /// Long-press action.
    pub secondary: Action,
}

impl Default for ButtonSetting {
    fn default() -> Self {
        Self {
            primary: Action::new(ActionKind::Noop),
            secondary: Action::disabled(),
        }
    }
}

impl ButtonSetting {
    /// Action in `slot`.
    pub fn action(&self, slot: ActionSlot) -> &Action {
        match slot {
            ActionSlot::Primary => &self.primary,
            ActionSlot::Secondary => &self.secondary,
        }
    }

    /// Mutable action in `slot`.
    pub fn action_mut(&mut self, slot: ActionSlot) -> &mut Action {
        match slot {
            ActionSlot::Primary => &mut self.primary,
            ActionSlot::Secondary => &mut self.secondary,
        }
    }

    /// Both actions, primary first.
    pub fn actions(&self) -> [&Action; 2] {
        [&self.primary, &self.secondary]
    }

    /// Both actions mutably, primary first.
    pub fn actions_mut(&mut self) -> [&mut Action; 2] {
        [&mut self.primary, &mut self.secondary]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/action.rs"]
mod tests;
