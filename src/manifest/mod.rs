//! Manifest: the derived listing of available elements.
//!
//! ARCHITECTURE
//! ============
//! `scan` is a pure function of the elements directory. `render`/`write`
//! turn the result into the machine-owned TypeScript module the editor
//! palette imports. `watch` owns the current manifest value, regenerates it
//! on filesystem changes, and publishes it over a `tokio::sync::watch`
//! channel so in-process readers never parse the generated file.

pub mod scan;
pub mod watch;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use scan::{regenerate, render, scan, write};
pub use watch::ManifestWatcher;

/// Prefix used for entry paths in the generated manifest.
pub const MANIFEST_PATH_PREFIX: &str = "/components";

/// First line of the generated file.
pub const GENERATED_MARKER: &str = "// This file is auto-generated. Do not edit manually.";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("elements directory not found: {0}")]
    RootMissing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialise manifest: {0}")]
    Serialise(#[from] serde_json::Error),
    #[error("filesystem watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

impl crate::error::ErrorCode for ManifestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RootMissing(_) => "E_MANIFEST_ROOT_MISSING",
            Self::Read { .. } => "E_MANIFEST_READ",
            Self::Write { .. } => "E_MANIFEST_WRITE",
            Self::Serialise(_) => "E_MANIFEST_SERIALISE",
            Self::Watch(_) => "E_MANIFEST_WATCH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub path: String,
    /// Sub-component files in the element directory, excluding its entry.
    pub components: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }
}
