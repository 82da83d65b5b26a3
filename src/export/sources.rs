//! Copying element sources and shared assets into the scaffold.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::ExportError;
use crate::config::SourceLayout;
use crate::element::{ElementRegistry, Resolved, is_safe_type_name};

/// What an export actually contained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Types whose folders were copied and are imported by the entry, sorted.
    pub copied: Vec<String>,
    /// Folders copied without an `index.tsx`; the entry renders a placeholder for them.
    pub no_entry: Vec<String>,
    /// Safe type names with no element folder on disk.
    pub missing: Vec<String>,
    /// Type names refused as import paths.
    pub rejected: Vec<String>,
    pub styles_copied: bool,
    pub interfaces_copied: bool,
    pub archive_entries: usize,
    pub archive_bytes: u64,
}

/// Distinct string `type` values in `elements`, split into safe and rejected.
///
/// Instances without a string type are left for the generated entry to
/// report at render time.
#[must_use]
pub fn partition_types(elements: &[Value]) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut safe = BTreeSet::new();
    let mut rejected = BTreeSet::new();
    for name in elements.iter().filter_map(|el| el.get("type").and_then(Value::as_str)) {
        if is_safe_type_name(name) {
            safe.insert(name.to_owned());
        } else {
            rejected.insert(name.to_owned());
        }
    }
    (safe, rejected)
}

/// Copy referenced element folders into `<project>/src/elements`.
///
/// # Errors
///
/// Returns `Copy` when a present element folder cannot be copied.
pub fn copy_elements(
    registry: &ElementRegistry,
    elements: &[Value],
    project: &Path,
    report: &mut ExportReport,
) -> Result<(), ExportError> {
    let dest_root = project.join("src").join("elements");
    std::fs::create_dir_all(&dest_root).map_err(|source| ExportError::Write { path: dest_root.clone(), source })?;

    let (safe, rejected) = partition_types(elements);
    for name in &rejected {
        warn!(element_type = %name, "invalid element type for dynamic import; not copied");
    }
    report.rejected = rejected.into_iter().collect();

    for name in safe {
        let Some(source_dir) = registry.source_dir(&name) else {
            warn!(element_type = %name, root = %registry.root().display(), "source directory for element not found");
            report.missing.push(name);
            continue;
        };
        let importable = match registry.resolve(&name) {
            Ok(Resolved::Known(_)) => true,
            Ok(Resolved::Unknown(_)) => {
                warn!(element_type = %name, "element folder has no index.tsx; copied but not imported");
                false
            }
            Err(e) => {
                // A broken descriptor surfaces in the build.
                warn!(element_type = %name, error = %e, "element settings unreadable; copying anyway");
                true
            }
        };
        copy_dir(&source_dir, &dest_root.join(&name))?;
        info!(element_type = %name, importable, "copied element");
        if importable {
            report.copied.push(name);
        } else {
            report.no_entry.push(name);
        }
    }
    Ok(())
}

/// Copy the global sheet to `src/styles/styles.css` and the interfaces tree
/// to `src/interfaces`. Absent sources are skipped with a warning.
///
/// # Errors
///
/// Returns `Copy` when a present source cannot be copied.
pub fn copy_shared(layout: &SourceLayout, project: &Path, report: &mut ExportReport) -> Result<(), ExportError> {
    let src = project.join("src");

    if layout.global_styles.is_file() {
        let dest = src.join("styles").join("styles.css");
        copy_file(&layout.global_styles, &dest)?;
        info!(from = %layout.global_styles.display(), "copied global style file");
        report.styles_copied = true;
    } else {
        warn!(path = %layout.global_styles.display(), "source style file not found, skipping");
    }

    if layout.interfaces_dir.is_dir() {
        copy_dir(&layout.interfaces_dir, &src.join("interfaces"))?;
        info!(from = %layout.interfaces_dir.display(), "copied interfaces directory");
        report.interfaces_copied = true;
    } else {
        warn!(path = %layout.interfaces_dir.display(), "source interfaces directory not found, skipping");
    }
    Ok(())
}

/// Recursive copy of regular files and directories. Other entry kinds
/// (symlinks, sockets) are skipped.
pub(crate) fn copy_dir(from: &Path, to: &Path) -> Result<(), ExportError> {
    let copy_err = |source| ExportError::Copy { from: from.to_path_buf(), to: to.to_path_buf(), source };
    std::fs::create_dir_all(to).map_err(copy_err)?;
    for entry in std::fs::read_dir(from).map_err(copy_err)? {
        let entry = entry.map_err(copy_err)?;
        let kind = entry.file_type().map_err(copy_err)?;
        let target = to.join(entry.file_name());
        if kind.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else if kind.is_file() {
            copy_file(&entry.path(), &target)?;
        } else {
            debug!(path = %entry.path().display(), "skipping non-regular entry");
        }
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), ExportError> {
    let copy_err = |source| ExportError::Copy { from: from.to_path_buf(), to: to.to_path_buf(), source };
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(copy_err)?;
    }
    std::fs::copy(from, to).map_err(copy_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
