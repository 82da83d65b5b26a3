//! Orchestration of one export, end to end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::archive::archive_dir;
use super::build::{BuildRunner, BuildStep};
use super::workdir::{self, CleanupPolicy};
use super::{ExportError, ExportReport, entry, project, sources};
use crate::config::SourceLayout;
use crate::element::ElementRegistry;

/// File name of the produced archive inside the work directory.
pub const ZIP_FILE_NAME: &str = "downloaded-layout.zip";

/// A finished export. The zip stays valid until the work dir is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub work_dir: PathBuf,
    pub zip_path: PathBuf,
    pub report: ExportReport,
}

pub struct ExportPipeline {
    layout: SourceLayout,
    registry: ElementRegistry,
    work_root: PathBuf,
    cleanup: CleanupPolicy,
    runner: Arc<dyn BuildRunner>,
}

impl ExportPipeline {
    #[must_use]
    pub fn new(layout: SourceLayout, work_root: PathBuf, cleanup: CleanupPolicy, runner: Arc<dyn BuildRunner>) -> Self {
        let registry = ElementRegistry::new(layout.elements_dir.clone());
        Self { layout, registry, work_root, cleanup, runner }
    }

    #[must_use]
    pub fn cleanup_policy(&self) -> CleanupPolicy {
        self.cleanup
    }

    /// Run every stage for `elements` in a fresh work directory.
    ///
    /// On failure the directory is handled by the cleanup policy before the
    /// error is returned; on success it is left for [`Self::release`].
    ///
    /// # Errors
    ///
    /// Any fatal stage error: scaffold or copy I/O, a failed or timed-out
    /// build step, a missing `dist/`, or an archiving failure.
    pub async fn run(&self, elements: &[Value]) -> Result<ExportArtifact, ExportError> {
        let work_root = self.work_root.clone();
        let work_dir = tokio::task::spawn_blocking(move || workdir::allocate(&work_root)).await??;
        info!(work_dir = %work_dir.display(), instances = elements.len(), "creating temporary project");

        match self.run_in(&work_dir, elements).await {
            Ok((zip_path, report)) => {
                info!(
                    zip = %zip_path.display(),
                    copied = report.copied.len(),
                    missing = report.missing.len(),
                    no_entry = report.no_entry.len(),
                    rejected = report.rejected.len(),
                    "export finished"
                );
                Ok(ExportArtifact { work_dir, zip_path, report })
            }
            Err(e) => {
                warn!(work_dir = %work_dir.display(), error = %e, "export failed");
                workdir::cleanup(&work_dir, self.cleanup, false).await;
                Err(e)
            }
        }
    }

    /// Apply the cleanup policy to a finished artifact.
    pub async fn release(&self, artifact: &ExportArtifact, delivered: bool) {
        workdir::cleanup(&artifact.work_dir, self.cleanup, delivered).await;
    }

    async fn run_in(&self, work_dir: &Path, elements: &[Value]) -> Result<(PathBuf, ExportReport), ExportError> {
        let mut report = {
            let (layout, registry, dir, elements) =
                (self.layout.clone(), self.registry.clone(), work_dir.to_path_buf(), elements.to_vec());
            tokio::task::spawn_blocking(move || prepare(&layout, &registry, &dir, &elements)).await??
        };

        self.runner.run(BuildStep::Install, work_dir).await?;
        self.runner.run(BuildStep::Build, work_dir).await?;

        let dist = work_dir.join("dist");
        let dist_present = tokio::fs::metadata(&dist).await.is_ok_and(|m| m.is_dir());
        if !dist_present {
            return Err(ExportError::MissingOutput(dist));
        }

        let zip_path = work_dir.join(ZIP_FILE_NAME);
        let summary = {
            let zip_path = zip_path.clone();
            tokio::task::spawn_blocking(move || archive_dir(&dist, &zip_path)).await??
        };
        report.archive_entries = summary.entries;
        report.archive_bytes = summary.bytes;
        Ok((zip_path, report))
    }
}

/// Filesystem stages before the build: scaffold, copy, and code generation.
fn prepare(
    layout: &SourceLayout,
    registry: &ElementRegistry,
    dir: &Path,
    elements: &[Value],
) -> Result<ExportReport, ExportError> {
    let mut report = ExportReport::default();
    project::write_scaffold(dir)?;
    sources::copy_shared(layout, dir, &mut report)?;
    sources::copy_elements(registry, elements, dir, &mut report)?;
    project::write_main(dir, report.styles_copied)?;
    entry::write_app(dir, elements, &report)?;
    Ok(report)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
