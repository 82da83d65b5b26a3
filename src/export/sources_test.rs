use serde_json::json;

use super::*;
use crate::state::test_helpers::{RULES_SETTINGS, TempTree, write_element, write_project};

#[test]
fn partition_dedupes_and_rejects_unsafe_names() {
    let elements = vec![
        json!({"id": "a", "type": "Rules"}),
        json!({"id": "b", "type": "Rules"}),
        json!({"id": "c", "type": "../../etc"}),
        json!({"id": "d", "type": 7}),
        json!({"id": "e"}),
    ];
    let (safe, rejected) = partition_types(&elements);
    assert_eq!(safe.into_iter().collect::<Vec<_>>(), vec!["Rules"]);
    assert_eq!(rejected.into_iter().collect::<Vec<_>>(), vec!["../../etc"]);
}

#[test]
fn copies_known_and_reports_missing() {
    let tree = TempTree::new();
    let layout = write_project(&tree);
    tree.write("src/elements/Rules/rules.module.scss", ".rules { color: red; }");
    let registry = ElementRegistry::new(&layout.elements_dir);
    let project = tree.join("out");

    let elements = vec![
        json!({"id": "a", "type": "Rules"}),
        json!({"id": "b", "type": "Ghost"}),
        json!({"id": "c", "type": "a/b"}),
    ];
    let mut report = ExportReport::default();
    copy_elements(&registry, &elements, &project, &mut report).unwrap();

    assert_eq!(report.copied, vec!["Rules"]);
    assert_eq!(report.missing, vec!["Ghost"]);
    assert_eq!(report.rejected, vec!["a/b"]);
    let copied = project.join("src/elements/Rules");
    assert!(copied.join("index.tsx").is_file());
    assert!(copied.join("settings.json").is_file());
    assert!(copied.join("rules.module.scss").is_file());
    assert!(!project.join("src/elements/Ghost").exists());
}

#[test]
fn element_with_broken_descriptor_is_still_copied() {
    let tree = TempTree::new();
    write_element(&tree.join("elements"), "Broken", "{ nope");
    let registry = ElementRegistry::new(tree.join("elements"));
    let project = tree.join("out");
    let mut report = ExportReport::default();
    copy_elements(&registry, &[json!({"id": "a", "type": "Broken"})], &project, &mut report).unwrap();
    assert_eq!(report.copied, vec!["Broken"]);
    assert!(project.join("src/elements/Broken/index.tsx").is_file());
}

#[test]
fn folder_without_tsx_entry_is_copied_but_not_imported() {
    let tree = TempTree::new();
    tree.write("elements/Widget/index.jsx", "export default () => null;\n");
    tree.write("elements/Widget/settings.json", RULES_SETTINGS);
    let registry = ElementRegistry::new(tree.join("elements"));
    let project = tree.join("out");
    let elements = vec![json!({"id": "a", "type": "Widget"})];
    let mut report = ExportReport::default();
    copy_elements(&registry, &elements, &project, &mut report).unwrap();

    assert!(report.copied.is_empty());
    assert!(report.missing.is_empty());
    assert_eq!(report.no_entry, vec!["Widget"]);
    assert!(project.join("src/elements/Widget/index.jsx").is_file());

    let source = crate::export::entry::app_module(&elements, &report).unwrap().render();
    assert!(!source.contains("./elements/Widget"));
}

#[test]
fn copy_dir_recurses() {
    let tree = TempTree::new();
    write_element(&tree.join("elements"), "Rules", RULES_SETTINGS);
    tree.write("elements/Rules/parts/Row.tsx", "export const Row = 1;");
    copy_dir(&tree.join("elements/Rules"), &tree.join("copy")).unwrap();
    assert!(tree.join("copy/parts/Row.tsx").is_file());
}

#[test]
fn shared_assets_are_copied_when_present() {
    let tree = TempTree::new();
    let layout = write_project(&tree);
    let project = tree.join("out");
    let mut report = ExportReport::default();
    copy_shared(&layout, &project, &mut report).unwrap();
    assert!(report.styles_copied);
    assert!(report.interfaces_copied);
    assert!(project.join("src/styles/styles.css").is_file());
    assert!(project.join("src/interfaces/settings.interfaces.ts").is_file());
}

#[test]
fn absent_shared_assets_are_tolerated() {
    let tree = TempTree::new();
    let layout = SourceLayout::under(tree.path());
    let mut report = ExportReport::default();
    copy_shared(&layout, &tree.join("out"), &mut report).unwrap();
    assert!(!report.styles_copied);
    assert!(!report.interfaces_copied);
}
