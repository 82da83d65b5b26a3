//! Export pipeline: instance list in, zipped static site out.
//!
//! ARCHITECTURE
//! ============
//! Stages run strictly in order and any fatal error aborts the export:
//!
//! 1. `workdir`  allocate a fresh, uniquely named project directory
//! 2. `project`  write the fixed Vite + React scaffold
//! 3. `sources`  copy referenced element folders and shared styles/interfaces
//! 4. `entry`    generate `src/App.tsx` from a structured module model
//! 5. `build`    `npm install` then `npm run build` through a [`BuildRunner`]
//! 6. `archive`  zip `dist/` into the work directory
//!
//! Missing collaborators (unknown element folders, absent shared styles) are
//! logged and recorded in the [`ExportReport`]; they never abort. Each export
//! owns its directory, so concurrent exports share nothing.

pub mod archive;
pub mod build;
pub mod entry;
pub mod pipeline;
pub mod project;
pub mod sources;
pub mod workdir;

use std::path::PathBuf;
use std::time::Duration;

pub use build::{BuildOutput, BuildRunner, BuildStep, NpmRunner};
pub use pipeline::{ExportArtifact, ExportPipeline, ZIP_FILE_NAME};
pub use sources::ExportReport;
pub use workdir::CleanupPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create work directory {path}: {source}")]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialise elements data: {0}")]
    Serialise(#[from] serde_json::Error),
    #[error("failed to start `{step}`: {source}")]
    Spawn {
        step: BuildStep,
        #[source]
        source: std::io::Error,
    },
    #[error("`{step}` failed ({status}):\n{output}")]
    StepFailed { step: BuildStep, status: String, output: String },
    #[error("`{step}` timed out after {after:?}")]
    Timeout { step: BuildStep, after: Duration },
    #[error("Build directory (dist) not found after build: {0}")]
    MissingOutput(PathBuf),
    #[error("failed to archive into {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("failed to read {path} while archiving: {source}")]
    ArchiveIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("export task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl crate::error::ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WorkDir { .. } => "E_EXPORT_WORKDIR",
            Self::Write { .. } => "E_EXPORT_WRITE",
            Self::Copy { .. } => "E_EXPORT_COPY",
            Self::Serialise(_) => "E_EXPORT_SERIALISE",
            Self::Spawn { .. } => "E_EXPORT_SPAWN",
            Self::StepFailed { .. } => "E_EXPORT_STEP_FAILED",
            Self::Timeout { .. } => "E_EXPORT_TIMEOUT",
            Self::MissingOutput(_) => "E_EXPORT_MISSING_OUTPUT",
            Self::Archive { .. } | Self::ArchiveIo { .. } => "E_EXPORT_ARCHIVE",
            Self::Join(_) => "E_EXPORT_JOIN",
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
