//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! carries the parsed config, the element registry, the export pipeline, and
//! a receiver for the current manifest. The manifest sender lives with the
//! watcher task (or is dropped after one scan when watching is disabled);
//! either way the receiver always holds the latest value.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::AppConfig;
use crate::element::ElementRegistry;
use crate::export::{BuildRunner, ExportPipeline};
use crate::manifest::Manifest;

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: ElementRegistry,
    pub pipeline: Arc<ExportPipeline>,
    pub manifest: watch::Receiver<Manifest>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, runner: Arc<dyn BuildRunner>, manifest: watch::Receiver<Manifest>) -> Self {
        let registry = ElementRegistry::new(config.layout.elements_dir.clone());
        let pipeline = ExportPipeline::new(
            config.layout.clone(),
            config.export.work_root.clone(),
            config.export.cleanup,
            runner,
        );
        Self { config: Arc::new(config), registry, pipeline: Arc::new(pipeline), manifest }
    }

    /// Latest published manifest.
    #[must_use]
    pub fn current_manifest(&self) -> Manifest {
        self.manifest.borrow().clone()
    }
}

#[cfg(test)]
#[path = "test_helpers.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
