//! External build steps.
//!
//! DESIGN
//! ======
//! The pipeline depends on the [`BuildRunner`] trait, not on npm. Production
//! uses [`NpmRunner`]; tests substitute a runner that fabricates `dist/`.
//! `NpmRunner` streams each output line to tracing as it arrives (target
//! `pagesmith::build`) and keeps a combined copy for the error report. The
//! child is killed if the step times out or its future is dropped.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Install,
    Build,
}

impl BuildStep {
    /// Arguments passed to the package manager.
    #[must_use]
    pub fn args(self) -> &'static [&'static str] {
        match self {
            Self::Install => &["install"],
            Self::Build => &["run", "build"],
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "npm install",
            Self::Build => "npm run build",
        })
    }
}

/// Combined console output of a successful step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub step: BuildStep,
    pub output: String,
}

#[async_trait]
pub trait BuildRunner: Send + Sync {
    /// Run `step` inside `project_dir` to completion.
    async fn run(&self, step: BuildStep, project_dir: &Path) -> Result<BuildOutput, ExportError>;
}

pub struct NpmRunner {
    program: String,
    timeout: Duration,
}

impl NpmRunner {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self { program: program.into(), timeout }
    }
}

#[async_trait]
impl BuildRunner for NpmRunner {
    async fn run(&self, step: BuildStep, project_dir: &Path) -> Result<BuildOutput, ExportError> {
        info!(%step, dir = %project_dir.display(), "running build step");
        let mut child = Command::new(&self.program)
            .args(step.args())
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExportError::Spawn { step, source })?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, step, "stdout", tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, step, "stderr", tx.clone()));
        }
        drop(tx);

        let finished = tokio::time::timeout(self.timeout, async {
            let status = child.wait().await;
            let mut output = String::new();
            while let Some(line) = rx.recv().await {
                output.push_str(&line);
                output.push('\n');
            }
            (status, output)
        })
        .await;

        let Ok((status, output)) = finished else {
            if let Err(e) = child.start_kill() {
                warn!(%step, error = %e, "failed to kill timed-out build step");
            }
            return Err(ExportError::Timeout { step, after: self.timeout });
        };

        let status = status.map_err(|source| ExportError::Spawn { step, source })?;
        if !status.success() {
            return Err(ExportError::StepFailed { step, status: status.to_string(), output });
        }
        info!(%step, "build step finished");
        Ok(BuildOutput { step, output })
    }
}

async fn forward_lines<R>(reader: R, step: BuildStep, stream: &'static str, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                info!(target: "pagesmith::build", %step, stream, "{line}");
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(%step, stream, error = %e, "failed to read build output");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "build_test.rs"]
mod tests;
