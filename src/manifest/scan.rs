//! Directory scan and generated-file rendering.

use std::path::Path;

use super::{GENERATED_MARKER, MANIFEST_PATH_PREFIX, Manifest, ManifestEntry, ManifestError};

/// Scan `root` for element directories.
///
/// Entries and their components are sorted so the output is a stable
/// function of directory contents. Hidden directories are skipped.
///
/// # Errors
///
/// Returns `RootMissing` when `root` is not a directory and `Read` when a
/// directory listing fails.
pub fn scan(root: &Path) -> Result<Manifest, ManifestError> {
    if !root.is_dir() {
        return Err(ManifestError::RootMissing(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    for entry in read_dir(root)? {
        let entry = entry.map_err(|source| ManifestError::Read { path: root.to_path_buf(), source })?;
        let file_type = entry
            .file_type()
            .map_err(|source| ManifestError::Read { path: entry.path(), source })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if file_type.is_dir() && !name.starts_with('.') {
            folders.push(name);
        }
    }
    folders.sort();

    let mut entries = Vec::with_capacity(folders.len());
    for name in folders {
        let components = scan_components(&root.join(&name))?;
        tracing::debug!(element = %name, ?components, "scanned element folder");
        entries.push(ManifestEntry { path: format!("{MANIFEST_PATH_PREFIX}/{name}"), name, components });
    }

    Ok(Manifest { entries })
}

fn scan_components(folder: &Path) -> Result<Vec<String>, ManifestError> {
    let mut components = Vec::new();
    for entry in read_dir(folder)? {
        let entry = entry.map_err(|source| ManifestError::Read { path: folder.to_path_buf(), source })?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with("index") {
            continue;
        }
        if let Some(stem) = file_name.strip_suffix(".tsx") {
            components.push(stem.to_owned());
        }
    }
    components.sort();
    Ok(components)
}

fn read_dir(path: &Path) -> Result<std::fs::ReadDir, ManifestError> {
    std::fs::read_dir(path).map_err(|source| ManifestError::Read { path: path.to_path_buf(), source })
}

/// Render the generated TypeScript module.
///
/// # Errors
///
/// Returns `Serialise` if the manifest cannot be encoded as JSON.
pub fn render(manifest: &Manifest) -> Result<String, ManifestError> {
    let json = serde_json::to_string_pretty(manifest)?;
    Ok(format!("{GENERATED_MARKER}\nexport const COMPONENT_MANIFEST = {json};\n"))
}

/// Overwrite the manifest file at `path`.
///
/// Writes are plain overwrites; concurrent writers resolve as last write
/// wins, which is safe because every write is a function of current
/// filesystem state.
///
/// # Errors
///
/// Returns `Write` when the parent directory or file cannot be written.
pub fn write(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    let contents = render(manifest)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ManifestError::Write { path: path.to_path_buf(), source })?;
    }
    std::fs::write(path, contents).map_err(|source| ManifestError::Write { path: path.to_path_buf(), source })
}

/// Scan `root` and write the result to `output`.
///
/// On failure the previous file is left untouched.
///
/// # Errors
///
/// Propagates scan and write failures.
pub fn regenerate(root: &Path, output: &Path) -> Result<Manifest, ManifestError> {
    let manifest = scan(root)?;
    write(output, &manifest)?;
    tracing::info!(entries = manifest.entries.len(), path = %output.display(), "element manifest updated");
    Ok(manifest)
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
