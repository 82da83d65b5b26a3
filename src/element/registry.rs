//! Element registry: resolves type names to on-disk definitions.
//!
//! DESIGN
//! ======
//! The filesystem is the source of truth; nothing is cached. Lookups return
//! an explicit [`Resolved`] so callers handle unknown types as a variant
//! instead of a missing map entry. Unsafe names resolve to `Unknown` before
//! any path is built from them.

use std::path::{Path, PathBuf};

use super::settings::{Settings, SettingsError};
use super::{ENTRY_FILE, SETTINGS_FILE, SETTINGS_MODULE_FILE, is_safe_type_name};

/// A resolved element: its directory, renderer entry, and settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDefinition {
    pub name: String,
    pub dir: PathBuf,
    /// The TSX renderer. The crate never evaluates it; it is copied into exports.
    pub entry: PathBuf,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Known(ElementDefinition),
    Unknown(String),
}

impl Resolved {
    #[must_use]
    pub fn known(self) -> Option<ElementDefinition> {
        match self {
            Self::Known(def) => Some(def),
            Self::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElementRegistry {
    root: PathBuf,
}

impl ElementRegistry {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `name`, or `None` when the name is unsafe or absent.
    #[must_use]
    pub fn source_dir(&self, name: &str) -> Option<PathBuf> {
        if !is_safe_type_name(name) {
            return None;
        }
        let dir = self.root.join(name);
        dir.is_dir().then_some(dir)
    }

    /// Resolve a type name to its definition.
    ///
    /// A directory without a renderer entry resolves to `Unknown`; a present
    /// element with a missing descriptor gets empty settings, matching how
    /// the editor treats a failed settings load.
    ///
    /// # Errors
    ///
    /// Returns an error when a settings descriptor exists but cannot be read
    /// or parsed.
    pub fn resolve(&self, name: &str) -> Result<Resolved, SettingsError> {
        let Some(dir) = self.source_dir(name) else {
            return Ok(Resolved::Unknown(name.to_owned()));
        };
        let entry = dir.join(ENTRY_FILE);
        if !entry.is_file() {
            return Ok(Resolved::Unknown(name.to_owned()));
        }
        let settings = read_settings_or_empty(name, &dir)?;
        Ok(Resolved::Known(ElementDefinition { name: name.to_owned(), dir, entry, settings }))
    }

    /// The `settings.ts` of an element whose descriptor was never converted
    /// to `settings.json`. Such an element resolves with empty settings.
    #[must_use]
    pub fn unconverted_descriptor(&self, name: &str) -> Option<PathBuf> {
        let dir = self.source_dir(name)?;
        unconverted_module(&dir)
    }

    /// Load only the settings descriptor for `name`.
    ///
    /// # Errors
    ///
    /// Returns `Read` when the element or its descriptor is missing, `Parse`
    /// when the descriptor is malformed.
    pub fn load_settings(&self, name: &str) -> Result<Settings, SettingsError> {
        let dir = self.source_dir(name).ok_or_else(|| SettingsError::Read {
            element: name.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "element not found"),
        })?;
        let path = dir.join(SETTINGS_FILE);
        let text = std::fs::read_to_string(&path)
            .map_err(|source| SettingsError::Read { element: name.to_owned(), source })?;
        Settings::from_json(name, &text)
    }
}

fn read_settings_or_empty(name: &str, dir: &Path) -> Result<Settings, SettingsError> {
    let path = dir.join(SETTINGS_FILE);
    match std::fs::read_to_string(&path) {
        Ok(text) => Settings::from_json(name, &text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if let Some(module) = unconverted_module(dir) {
                tracing::warn!(
                    element_type = %name,
                    module = %module.display(),
                    expected = %path.display(),
                    "settings.ts has no settings.json; convert the descriptor to JSON. Using empty settings"
                );
            } else {
                tracing::warn!(element_type = %name, path = %path.display(), "settings descriptor missing; using empty settings");
            }
            Ok(Settings::default())
        }
        Err(source) => Err(SettingsError::Read { element: name.to_owned(), source }),
    }
}

fn unconverted_module(dir: &Path) -> Option<PathBuf> {
    let module = dir.join(SETTINGS_MODULE_FILE);
    (!dir.join(SETTINGS_FILE).exists() && module.is_file()).then_some(module)
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
