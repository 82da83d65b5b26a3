use super::test_helpers::{FakeRunner, TempTree, test_app_state, write_project};
use super::*;

#[test]
fn state_wires_config_into_registry_and_manifest() {
    let tree = TempTree::new();
    let layout = write_project(&tree);
    let state = test_app_state(&tree, Arc::new(FakeRunner::new()));

    assert_eq!(state.registry.root(), layout.elements_dir.as_path());
    assert_eq!(state.config.layout, layout);
    assert_eq!(state.current_manifest().names(), vec!["Rules", "dialog"]);
}

#[test]
fn clones_share_the_pipeline() {
    let tree = TempTree::new();
    write_project(&tree);
    let state = test_app_state(&tree, Arc::new(FakeRunner::new()));
    let clone = state.clone();
    assert!(Arc::ptr_eq(&state.pipeline, &clone.pipeline));
    assert!(Arc::ptr_eq(&state.config, &clone.config));
}
