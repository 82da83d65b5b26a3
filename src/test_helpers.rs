//! Fixtures shared by unit tests across modules.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use super::AppState;
use crate::config::{AppConfig, SourceLayout};
use crate::export::{BuildOutput, BuildRunner, BuildStep, CleanupPolicy, ExportError};
use crate::manifest;

pub const RULES_SETTINGS: &str = r##"{
  "allowedStyles": ["color", "backgroundColor", "fontSize"],
  "defaultStyles": { "color": "#000000", "backgroundColor": "#ffffff", "fontSize": "1rem" }
}"##;

pub const DIALOG_SETTINGS: &str = r##"{
  "allowedStyles": ["color", "backgroundColor", "fontSize"],
  "defaultStyles": { "color": "#000000", "backgroundColor": "#ffffff", "fontSize": "1rem" },
  "javascript": {
    "controls": {
      "dialogState": { "label": "Dialog Visibility", "type": "select", "options": ["visible", "hidden"], "defaultValue": "hidden" },
      "titleText": { "label": "Dialog Title", "type": "text", "defaultValue": "My Dialog" },
      "messageText": { "label": "Dialog Message", "type": "text", "defaultValue": "This is a dialog message" }
    }
  }
}"##;

// =============================================================================
// FILESYSTEM
// =============================================================================

/// Throwaway directory under the OS temp dir, removed on drop.
pub struct TempTree {
    root: PathBuf,
}

impl TempTree {
    #[must_use]
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("pagesmith-test-{}", Uuid::new_v4().simple()));
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn join(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Write `contents` at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

impl Drop for TempTree {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            eprintln!("failed to remove {}: {e}", self.root.display());
        }
    }
}

/// Create `<root>/<name>` with an entry, a descriptor, and its TS wrapper.
pub fn write_element(root: &Path, name: &str, settings_json: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("index.tsx"),
        format!("const {name} = ({{ message = 'Hello from {name}' }}) => <div>{{message}}</div>;\nexport default {name};\n"),
    )
    .unwrap();
    std::fs::write(dir.join("settings.json"), settings_json).unwrap();
    std::fs::write(dir.join("settings.ts"), "import descriptor from './settings.json';\nexport default descriptor;\n").unwrap();
}

/// Editor project with `Rules`, `dialog`, a global sheet, and interfaces.
pub fn write_project(tree: &TempTree) -> SourceLayout {
    let layout = SourceLayout::under(tree.path());
    write_element(&layout.elements_dir, "Rules", RULES_SETTINGS);
    write_element(&layout.elements_dir, "dialog", DIALOG_SETTINGS);
    tree.write("src/styles.css", "body { margin: 0; }\n");
    tree.write("src/interfaces/settings.interfaces.ts", "export interface Settings { allowedStyles: string[] }\n");
    layout
}

// =============================================================================
// BUILD RUNNER
// =============================================================================

/// Stand-in for npm: records steps and fabricates `dist/` on build.
///
/// The fake bundle copies `src/App.tsx` to `dist/assets/app.js` so tests can
/// inspect the generated entry through the zip.
pub struct FakeRunner {
    calls: Mutex<Vec<BuildStep>>,
    fail_on: Option<BuildStep>,
    emit_dist: bool,
}

impl FakeRunner {
    #[must_use]
    pub fn new() -> Self {
        Self { calls: Mutex::new(Vec::new()), fail_on: None, emit_dist: true }
    }

    #[must_use]
    pub fn failing_on(step: BuildStep) -> Self {
        Self { fail_on: Some(step), ..Self::new() }
    }

    /// Succeeds without producing `dist/`.
    #[must_use]
    pub fn without_dist() -> Self {
        Self { emit_dist: false, ..Self::new() }
    }

    #[must_use]
    pub fn calls(&self) -> Vec<BuildStep> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildRunner for FakeRunner {
    async fn run(&self, step: BuildStep, project_dir: &Path) -> Result<BuildOutput, ExportError> {
        self.calls.lock().unwrap().push(step);
        if self.fail_on == Some(step) {
            return Err(ExportError::StepFailed {
                step,
                status: "exit status: 1".into(),
                output: "npm ERR! fake failure".into(),
            });
        }
        if step == BuildStep::Build && self.emit_dist {
            let dist = project_dir.join("dist");
            std::fs::create_dir_all(dist.join("assets")).unwrap();
            std::fs::write(dist.join("index.html"), "<!DOCTYPE html><div id=\"root\"></div>\n").unwrap();
            std::fs::copy(project_dir.join("src/App.tsx"), dist.join("assets/app.js")).unwrap();
        }
        Ok(BuildOutput { step, output: format!("fake {step}") })
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Config rooted at `tree`, with exports under `<tree>/work`.
#[must_use]
pub fn test_config(tree: &TempTree, cleanup: CleanupPolicy) -> AppConfig {
    let work = tree.join("work").to_string_lossy().into_owned();
    let cleanup = match cleanup {
        CleanupPolicy::Keep => "keep",
        CleanupPolicy::OnSuccess => "on_success",
        CleanupPolicy::Always => "always",
    };
    AppConfig::from_lookup(tree.path(), |key| match key {
        "EXPORT_WORK_ROOT" => Some(work.clone()),
        "EXPORT_CLEANUP" => Some(cleanup.to_owned()),
        _ => None,
    })
    .unwrap()
}

/// `AppState` over a fixture project, using `runner` for builds.
#[must_use]
pub fn test_app_state(tree: &TempTree, runner: Arc<dyn BuildRunner>) -> AppState {
    test_app_state_with(tree, runner, CleanupPolicy::Keep)
}

#[must_use]
pub fn test_app_state_with(tree: &TempTree, runner: Arc<dyn BuildRunner>, cleanup: CleanupPolicy) -> AppState {
    let config = test_config(tree, cleanup);
    let current = manifest::scan(&config.layout.elements_dir).unwrap_or_default();
    let (_tx, rx) = watch::channel(current);
    AppState::new(config, runner, rx)
}
