/// Convenience result type used across deckcfg.
pub type DeckResult<T> = Result<T, DeckError>;

/// Top-level error taxonomy used by editor, pipeline and codec APIs.
#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    /// Rejected mutation: bad index, bad grid size or a broken document invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed or unsupported binary configuration buffer.
    #[error("format error: {0}")]
    Format(String),

    /// Source image (or text) that could not be rasterized.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// Errors when serializing or deserializing project files or persisted templates.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    /// Build a [`DeckError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DeckError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`DeckError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`DeckError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for DeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
