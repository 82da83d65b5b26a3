//! Element Definitions: the reusable UI units the palette offers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each definition is a directory under the elements root named after its
//! type. The directory holds the TSX renderer (`index.tsx`), the settings
//! descriptor (`settings.json`, re-exported to TSX by `settings.ts`), and any
//! style modules. The registry reads descriptors; the exporter copies whole
//! directories; the scaffolder creates new ones.

pub mod registry;
pub mod scaffold;
pub mod settings;

pub use registry::{ElementDefinition, ElementRegistry, Resolved};
pub use settings::{ControlDefinition, ControlValue, Controls, Settings, SettingsError};

/// Renderer entry file inside an element directory.
pub const ENTRY_FILE: &str = "index.tsx";

/// Settings descriptor read by the registry and bundled into exports.
pub const SETTINGS_FILE: &str = "settings.json";

/// TSX-side wrapper around [`SETTINGS_FILE`].
pub const SETTINGS_MODULE_FILE: &str = "settings.ts";

/// Whether `name` may be used as a directory name and an import path segment.
///
/// Only ASCII letters, digits, `-` and `_` are accepted. Anything else is
/// treated as a potential path injection and never touches the filesystem.
#[must_use]
pub fn is_safe_type_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
