use crate::foundation::error::{DeckError, DeckResult};

/// Horizontal resolution of one tile display in pixels.
pub const TILE_WIDTH: u32 = 128;
/// Vertical resolution of one tile display in pixels.
pub const TILE_HEIGHT: u32 = 64;
/// Bytes per packed bitmap row (1 bit per pixel).
pub const TILE_ROW_BYTES: usize = (TILE_WIDTH / 8) as usize;
/// Bytes per packed tile bitmap.
pub const TILE_BYTES: usize = TILE_ROW_BYTES * TILE_HEIGHT as usize;
/// Largest accepted grid width or height.
pub const MAX_GRID_DIM: u8 = 16;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Binary configuration format version (`major.minor.patch`).
pub struct FormatVersion {
    /// Incompatible layout revisions.
    pub major: u8,
    /// Backwards compatible additions (minor 1 adds the settings extension).
    pub minor: u8,
    /// Fixes with no layout change.
    pub patch: u8,
}

impl FormatVersion {
    /// Version written by this crate.
    pub const CURRENT: Self = Self {
        major: 1,
        minor: 1,
        patch: 0,
    };

    /// Build a version from its parts.
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether this crate can read and write buffers of this version.
    pub fn is_supported(self) -> bool {
        self.major == Self::CURRENT.major
    }

    /// Whether buffers of this version carry the per-display settings extension.
    pub fn has_settings_extension(self) -> bool {
        self.minor >= 1
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for FormatVersion {
    type Err = DeckError;

    fn from_str(s: &str) -> DeckResult<Self> {
        let mut parts = s.trim().split('.');
        let mut next = |name: &str| -> DeckResult<u8> {
            parts
                .next()
                .ok_or_else(|| DeckError::validation(format!("format version is missing {name}")))?
                .parse::<u8>()
                .map_err(|e| DeckError::validation(format!("format version {name}: {e}")))
        };
        let version = Self::new(next("major")?, next("minor")?, next("patch")?);
        if parts.next().is_some() {
            return Err(DeckError::validation(
                "format version must have exactly three parts",
            ));
        }
        Ok(version)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Coordinates of one tile: page index plus row-major button index on that page.
pub struct SlotRef {
    /// Page index.
    pub page: usize,
    /// Button (and display) index within the page.
    pub button: usize,
}

impl SlotRef {
    /// Build a slot reference.
    pub const fn new(page: usize, button: usize) -> Self {
        Self { page, button }
    }
}

impl std::fmt::Display for SlotRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {} button {}", self.page, self.button)
    }
}
