use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    foundation::core::SlotRef,
    foundation::error::{DeckError, DeckResult},
};

/// Store key under which the default-back template is persisted.
pub const DEFAULT_BACK_DISPLAY_KEY: &str = "defaultBackDisplay";

/// String key/value persistence used for the default-back template.
pub trait TemplateStore {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> DeckResult<Option<String>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> DeckResult<()>;
}

#[derive(Clone, Debug, Default)]
/// In-process [`TemplateStore`].
pub struct MemoryTemplateStore {
    entries: BTreeMap<String, String>,
}

impl MemoryTemplateStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn get(&self, key: &str) -> DeckResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> DeckResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Clone, Debug)]
/// [`TemplateStore`] keeping one `<key>.json` file per key in a directory.
pub struct FileTemplateStore {
    dir: PathBuf,
}

impl FileTemplateStore {
    /// Store rooted at `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> DeckResult<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DeckError::validation(format!(
                "template store key '{key}' must be non-empty ASCII alphanumerics, '-' or '_'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl TemplateStore for FileTemplateStore {
    fn get(&self, key: &str) -> DeckResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("read template from '{}'", path.display()))
                .into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> DeckResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create state directory '{}'", self.dir.display()))?;
        std::fs::write(&path, value)
            .with_context(|| format!("write template to '{}'", path.display()))?;
        Ok(())
    }
}

/// Device link that accepts an encoded configuration buffer.
pub trait Transport {
    /// Send the whole buffer to the device.
    fn send(&mut self, bytes: &[u8]) -> DeckResult<()>;
}

impl Transport for Vec<u8> {
    fn send(&mut self, bytes: &[u8]) -> DeckResult<()> {
        self.clear();
        self.extend_from_slice(bytes);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Where a configuration to load comes from.
pub enum ConfigSource {
    /// Raw encoded buffer.
    Buffer(Vec<u8>),
    /// Files picked by the user; the first one holds the configuration.
    Files(Vec<PathBuf>),
}

/// Normalize a [`ConfigSource`] into an encoded buffer.
pub fn read_source(source: ConfigSource) -> DeckResult<Vec<u8>> {
    match source {
        ConfigSource::Buffer(bytes) => Ok(bytes),
        ConfigSource::Files(paths) => {
            let path = paths
                .first()
                .ok_or_else(|| DeckError::validation("no configuration file selected"))?;
            if paths.len() > 1 {
                tracing::warn!(
                    ignored = paths.len() - 1,
                    path = %path.display(),
                    "several files selected; loading the first"
                );
            }
            let bytes = std::fs::read(path)
                .with_context(|| format!("read config from '{}'", path.display()))?;
            Ok(bytes)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Transient, non-fatal message produced by a committed edit.
pub enum Notice {
    /// A display's source could not be rendered; its previous bitmap was kept.
    ImageNotRendered {
        /// Affected display, or `None` for the template.
        slot: Option<SlotRef>,
        /// Renderer message.
        message: String,
    },
    /// The new default-back template could not be persisted.
    TemplateNotPersisted {
        /// Store message.
        message: String,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageNotRendered {
                slot: Some(slot),
                message,
            } => write!(f, "could not render {slot}: {message}"),
            Self::ImageNotRendered {
                slot: None,
                message,
            } => write!(f, "could not render the default back image: {message}"),
            Self::TemplateNotPersisted { message } => {
                write!(f, "could not save the default back image: {message}")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/services.rs"]
mod tests;
