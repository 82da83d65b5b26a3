//! Zip the build output.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ExportError;

/// Entry count and size of a finished archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entries: usize,
    pub bytes: u64,
}

/// Write every file under `src_dir` into `zip_path`, with entry names
/// relative to `src_dir`. Blocking; run it off the async runtime.
///
/// Files that vanish between listing and reading are skipped with a
/// warning. Any other failure is fatal.
///
/// # Errors
///
/// Returns `ArchiveIo` for filesystem failures and `Archive` for zip
/// encoding failures.
pub fn archive_dir(src_dir: &Path, zip_path: &Path) -> Result<ArchiveSummary, ExportError> {
    let mut files = Vec::new();
    collect_files(src_dir, src_dir, &mut files)?;
    files.sort();
    write_archive(&files, zip_path)
}

/// Write `(entry name, path)` pairs into `zip_path` in the given order.
/// A path that no longer exists is skipped with a warning.
pub(crate) fn write_archive(files: &[(String, PathBuf)], zip_path: &Path) -> Result<ArchiveSummary, ExportError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ExportError::ArchiveIo { path, source }
    };
    let zip_err = |source| ExportError::Archive { path: zip_path.to_path_buf(), source };

    let out = File::create(zip_path).map_err(io_err(zip_path))?;
    let mut writer = ZipWriter::new(BufWriter::new(out));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut entries = 0;
    for (name, path) in files {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "archive entry vanished; skipping");
                continue;
            }
            Err(e) => return Err(io_err(path)(e)),
        };
        writer.start_file(name.as_str(), options).map_err(zip_err)?;
        io::copy(&mut file, &mut writer).map_err(io_err(path))?;
        entries += 1;
    }

    let mut buffered = writer.finish().map_err(zip_err)?;
    io::Write::flush(&mut buffered).map_err(io_err(zip_path))?;
    drop(buffered);

    let bytes = std::fs::metadata(zip_path).map_err(io_err(zip_path))?.len();
    info!(zip = %zip_path.display(), entries, bytes, "archive created");
    Ok(ArchiveSummary { entries, bytes })
}

/// `(entry name, absolute path)` for every regular file below `dir`.
fn collect_files(base: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> Result<(), ExportError> {
    let read_err = |source| ExportError::ArchiveIo { path: dir.to_path_buf(), source };
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        let kind = entry.file_type().map_err(read_err)?;
        if kind.is_dir() {
            collect_files(base, &path, out)?;
        } else if kind.is_file() {
            if let Ok(relative) = path.strip_prefix(base) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push((name, path));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod tests;
