use super::*;
use crate::state::test_helpers::TempTree;

fn fixture() -> TempTree {
    let tree = TempTree::new();
    tree.write("Rules/index.tsx", "");
    tree.write("Rules/settings.json", "{}");
    tree.write("Leaderboard/index.tsx", "");
    tree.write("Leaderboard/Row.tsx", "");
    tree.write("Leaderboard/Header.tsx", "");
    tree.write("Leaderboard/action.ts", "");
    tree.write("Leaderboard/leaderboard.module.scss", "");
    tree.write("Leaderboard/indexHelpers.tsx", "");
    tree.write("stray.tsx", "");
    tree.write(".cache/index.tsx", "");
    tree
}

#[test]
fn lists_directories_sorted_with_component_files() {
    let tree = fixture();
    let manifest = scan(tree.path()).unwrap();

    assert_eq!(manifest.names(), vec!["Leaderboard", "Rules"]);
    let leaderboard = &manifest.entries[0];
    assert_eq!(leaderboard.path, "/components/Leaderboard");
    assert_eq!(leaderboard.components, vec!["Header", "Row"]);
    assert!(manifest.entries[1].components.is_empty());
}

#[test]
fn hidden_directories_and_loose_files_are_ignored() {
    let tree = fixture();
    let manifest = scan(tree.path()).unwrap();
    assert!(!manifest.contains(".cache"));
    assert!(!manifest.contains("stray"));
}

#[test]
fn missing_root_is_an_error() {
    let tree = TempTree::new();
    let err = scan(&tree.path().join("nope")).unwrap_err();
    assert!(matches!(err, ManifestError::RootMissing(_)));
}

#[test]
fn render_emits_marker_and_export() {
    let manifest = Manifest {
        entries: vec![ManifestEntry { name: "Rules".into(), path: "/components/Rules".into(), components: vec![] }],
    };
    let text = render(&manifest).unwrap();
    assert!(text.starts_with(GENERATED_MARKER));
    assert!(text.contains("export const COMPONENT_MANIFEST = ["));
    assert!(text.contains("\"name\": \"Rules\""));
    assert!(text.ends_with("];\n"));
}

#[test]
fn regenerate_writes_file_under_new_parent() {
    let tree = fixture();
    let output = tree.path().join("generated/utils/elementManifest.ts");
    let manifest = regenerate(tree.path(), &output).unwrap();
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text, render(&manifest).unwrap());
}

#[test]
fn failed_regeneration_leaves_previous_file() {
    let tree = fixture();
    let output = tree.path().join("elementManifest.ts");
    regenerate(tree.path(), &output).unwrap();
    let before = std::fs::read_to_string(&output).unwrap();

    assert!(regenerate(&tree.path().join("missing"), &output).is_err());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), before);
}
