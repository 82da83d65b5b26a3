//! Per-export working directories and their lifetime.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};
use uuid::Uuid;

use super::ExportError;

/// Prefix of every allocated work directory.
pub const WORK_DIR_PREFIX: &str = "builder-react-export-";

/// What happens to a work directory once its export is finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Leave every directory in place for inspection.
    #[default]
    Keep,
    /// Remove after a delivered export; keep failures for debugging.
    OnSuccess,
    Always,
}

impl CleanupPolicy {
    #[must_use]
    pub fn should_remove(self, succeeded: bool) -> bool {
        match self {
            Self::Keep => false,
            Self::OnSuccess => succeeded,
            Self::Always => true,
        }
    }
}

/// Create a fresh directory under `work_root`.
///
/// The name combines wall-clock millis with random hex, and `create_dir`
/// refuses an existing path, so two exports never share a directory.
///
/// # Errors
///
/// Returns `WorkDir` when the root or the directory cannot be created.
pub fn allocate(work_root: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(work_root)
        .map_err(|source| ExportError::WorkDir { path: work_root.to_path_buf(), source })?;
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis());
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    let dir = work_root.join(format!("{WORK_DIR_PREFIX}{millis}-{suffix}"));
    std::fs::create_dir(&dir).map_err(|source| ExportError::WorkDir { path: dir.clone(), source })?;
    Ok(dir)
}

/// Apply `policy` to a finished export's directory. Removal failures are logged.
pub async fn cleanup(dir: &Path, policy: CleanupPolicy, succeeded: bool) {
    if !policy.should_remove(succeeded) {
        info!(work_dir = %dir.display(), ?policy, succeeded, "keeping export work directory");
        return;
    }
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => info!(work_dir = %dir.display(), "removed export work directory"),
        Err(e) => warn!(work_dir = %dir.display(), error = %e, "failed to remove export work directory"),
    }
}

#[cfg(test)]
#[path = "workdir_test.rs"]
mod tests;
