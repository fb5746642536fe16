//! Display rendering: source decode, text layout, monochrome conversion and previews.

pub(crate) mod compose;
pub(crate) mod fonts;
pub(crate) mod mono;
pub(crate) mod preview;
pub(crate) mod source;
pub(crate) mod text;
