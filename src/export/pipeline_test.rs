use std::fs::File;
use std::io::Read;

use serde_json::json;

use super::*;
use crate::state::test_helpers::{FakeRunner, TempTree, write_project};

fn pipeline(tree: &TempTree, runner: Arc<FakeRunner>, cleanup: CleanupPolicy) -> ExportPipeline {
    let layout = write_project(tree);
    ExportPipeline::new(layout, tree.join("work"), cleanup, runner)
}

fn zipped_entry(zip_path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

fn work_dirs(tree: &TempTree) -> usize {
    std::fs::read_dir(tree.join("work")).map_or(0, Iterator::count)
}

#[tokio::test]
async fn known_elements_produce_a_zip() {
    let tree = TempTree::new();
    let runner = Arc::new(FakeRunner::new());
    let pipeline = pipeline(&tree, runner.clone(), CleanupPolicy::Keep);
    let elements = vec![json!({"id": "a", "type": "Rules", "styles": {}, "jsSettings": {}})];

    let artifact = pipeline.run(&elements).await.unwrap();

    assert_eq!(runner.calls(), vec![BuildStep::Install, BuildStep::Build]);
    assert!(artifact.zip_path.is_file());
    assert_eq!(artifact.zip_path, artifact.work_dir.join(ZIP_FILE_NAME));
    assert_eq!(artifact.report.copied, vec!["Rules"]);
    assert!(artifact.report.styles_copied && artifact.report.interfaces_copied);
    assert_eq!(artifact.report.archive_entries, 2);
    assert!(artifact.report.archive_bytes > 0);

    let work = &artifact.work_dir;
    assert!(work.join("src/elements/Rules/index.tsx").is_file());
    let main = std::fs::read_to_string(work.join("src/main.tsx")).unwrap();
    assert!(main.contains("./styles/styles.css"));

    let app = zipped_entry(&artifact.zip_path, "assets/app.js");
    assert!(app.contains("'Rules': lazy(() => import('./elements/Rules')),"));
    assert!(zipped_entry(&artifact.zip_path, "index.html").contains("root"));
}

#[tokio::test]
async fn empty_instance_list_still_builds() {
    let tree = TempTree::new();
    let pipeline = pipeline(&tree, Arc::new(FakeRunner::new()), CleanupPolicy::Keep);
    let artifact = pipeline.run(&[]).await.unwrap();
    assert!(artifact.report.copied.is_empty());
    let app = zipped_entry(&artifact.zip_path, "assets/app.js");
    assert!(app.contains("JSON.parse('[]')"));
}

#[tokio::test]
async fn unknown_type_completes_with_placeholder() {
    let tree = TempTree::new();
    let pipeline = pipeline(&tree, Arc::new(FakeRunner::new()), CleanupPolicy::Keep);
    let elements = vec![
        json!({"id": "a", "type": "Ghost"}),
        json!({"id": "b", "type": "../../secret"}),
    ];
    let artifact = pipeline.run(&elements).await.unwrap();
    assert_eq!(artifact.report.missing, vec!["Ghost"]);
    assert_eq!(artifact.report.rejected, vec!["../../secret"]);

    let app = zipped_entry(&artifact.zip_path, "assets/app.js");
    assert!(!app.contains("import('./elements/Ghost')"));
    assert!(!app.contains("import('./elements/../../secret')"));
    assert!(app.contains("not found or not in map."));
}

#[tokio::test]
async fn build_failure_aborts_and_honours_cleanup() {
    let tree = TempTree::new();
    let runner = Arc::new(FakeRunner::failing_on(BuildStep::Build));
    let pipeline = pipeline(&tree, runner.clone(), CleanupPolicy::Always);
    let err = pipeline.run(&[json!({"id": "a", "type": "Rules"})]).await.unwrap_err();

    assert!(matches!(err, ExportError::StepFailed { step: BuildStep::Build, .. }));
    assert!(err.to_string().contains("npm ERR! fake failure"));
    assert_eq!(runner.calls(), vec![BuildStep::Install, BuildStep::Build]);
    assert_eq!(work_dirs(&tree), 0);
}

#[tokio::test]
async fn install_failure_skips_build() {
    let tree = TempTree::new();
    let runner = Arc::new(FakeRunner::failing_on(BuildStep::Install));
    let pipeline = pipeline(&tree, runner.clone(), CleanupPolicy::OnSuccess);
    assert!(pipeline.run(&[]).await.is_err());
    assert_eq!(runner.calls(), vec![BuildStep::Install]);
    // Failures are kept under on_success.
    assert_eq!(work_dirs(&tree), 1);
}

#[tokio::test]
async fn missing_dist_is_fatal() {
    let tree = TempTree::new();
    let pipeline = pipeline(&tree, Arc::new(FakeRunner::without_dist()), CleanupPolicy::Keep);
    let err = pipeline.run(&[]).await.unwrap_err();
    assert!(matches!(err, ExportError::MissingOutput(_)));
    assert!(err.to_string().contains("Build directory (dist) not found"));
}

#[tokio::test]
async fn concurrent_exports_use_separate_dirs() {
    let tree = TempTree::new();
    let pipeline = pipeline(&tree, Arc::new(FakeRunner::new()), CleanupPolicy::Keep);
    let a = vec![json!({"id": "a", "type": "Rules"})];
    let b = vec![json!({"id": "b", "type": "dialog"})];
    let (ra, rb) = tokio::join!(pipeline.run(&a), pipeline.run(&b));
    let (ra, rb) = (ra.unwrap(), rb.unwrap());
    assert_ne!(ra.work_dir, rb.work_dir);
    assert_eq!(ra.report.copied, vec!["Rules"]);
    assert_eq!(rb.report.copied, vec!["dialog"]);
}

#[tokio::test]
async fn release_applies_policy() {
    let tree = TempTree::new();
    let pipeline = pipeline(&tree, Arc::new(FakeRunner::new()), CleanupPolicy::OnSuccess);
    let artifact = pipeline.run(&[]).await.unwrap();
    pipeline.release(&artifact, false).await;
    assert!(artifact.work_dir.is_dir());
    pipeline.release(&artifact, true).await;
    assert!(!artifact.work_dir.exists());
}

#[cfg(feature = "live-npm-tests")]
#[tokio::test]
async fn real_npm_build_produces_index_html() {
    use crate::export::NpmRunner;

    let tree = TempTree::new();
    let runner = Arc::new(NpmRunner::new("npm", std::time::Duration::from_secs(600)));
    let pipeline = ExportPipeline::new(write_project(&tree), tree.join("work"), CleanupPolicy::Keep, runner);
    let artifact = pipeline.run(&[json!({"id": "a", "type": "Rules", "styles": {}})]).await.unwrap();
    let archive = zip::ZipArchive::new(File::open(&artifact.zip_path).unwrap()).unwrap();
    assert!(archive.file_names().any(|n| n == "index.html"));
}
