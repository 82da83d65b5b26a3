use super::*;
use crate::state::test_helpers::{DIALOG_SETTINGS, RULES_SETTINGS, TempTree, write_element};

#[test]
fn resolves_present_element_with_settings() {
    let tree = TempTree::new();
    write_element(tree.path(), "Rules", RULES_SETTINGS);
    let registry = ElementRegistry::new(tree.path());

    let Resolved::Known(def) = registry.resolve("Rules").unwrap() else {
        panic!("Rules should resolve");
    };
    assert_eq!(def.name, "Rules");
    assert_eq!(def.entry, tree.path().join("Rules").join("index.tsx"));
    assert_eq!(def.settings.allowed_styles, vec!["color", "backgroundColor", "fontSize"]);
}

#[test]
fn absent_element_is_unknown() {
    let tree = TempTree::new();
    let registry = ElementRegistry::new(tree.path());
    assert_eq!(registry.resolve("Ghost").unwrap(), Resolved::Unknown("Ghost".into()));
}

#[test]
fn directory_without_entry_is_unknown() {
    let tree = TempTree::new();
    tree.write("Half/settings.json", RULES_SETTINGS);
    let registry = ElementRegistry::new(tree.path());
    assert!(registry.resolve("Half").unwrap().known().is_none());
}

#[test]
fn unsafe_name_never_touches_filesystem() {
    let tree = TempTree::new();
    write_element(tree.path(), "Rules", RULES_SETTINGS);
    let inner = ElementRegistry::new(tree.path().join("Rules"));
    // `..` exists on disk relative to the inner root but must not resolve.
    assert_eq!(inner.resolve("..").unwrap(), Resolved::Unknown("..".into()));
    assert!(inner.source_dir("../Rules").is_none());
}

#[test]
fn missing_descriptor_resolves_with_empty_settings() {
    let tree = TempTree::new();
    tree.write("Plain/index.tsx", "export default () => null;\n");
    let registry = ElementRegistry::new(tree.path());
    let def = registry.resolve("Plain").unwrap().known().unwrap();
    assert!(def.settings.allowed_styles.is_empty());
    assert!(def.settings.javascript.is_none());
}

#[test]
fn ts_only_descriptor_is_flagged_for_conversion() {
    let tree = TempTree::new();
    tree.write("Rules/index.tsx", "export default () => null;\n");
    tree.write("Rules/settings.ts", "export const settings = { allowedStyles: ['color'] };\n");
    let registry = ElementRegistry::new(tree.path());

    assert_eq!(registry.unconverted_descriptor("Rules"), Some(tree.path().join("Rules").join("settings.ts")));
    let def = registry.resolve("Rules").unwrap().known().unwrap();
    assert!(def.settings.allowed_styles.is_empty());

    write_element(tree.path(), "dialog", DIALOG_SETTINGS);
    assert_eq!(registry.unconverted_descriptor("dialog"), None);
    assert_eq!(registry.unconverted_descriptor("Ghost"), None);
}

#[test]
fn malformed_descriptor_is_an_error() {
    let tree = TempTree::new();
    write_element(tree.path(), "Broken", "{ not json");
    let registry = ElementRegistry::new(tree.path());
    assert!(matches!(registry.resolve("Broken"), Err(SettingsError::Parse { .. })));
}

#[test]
fn load_settings_reads_controls() {
    let tree = TempTree::new();
    write_element(tree.path(), "dialog", DIALOG_SETTINGS);
    let registry = ElementRegistry::new(tree.path());
    let settings = registry.load_settings("dialog").unwrap();
    assert_eq!(settings.controls().len(), 3);
}

#[test]
fn load_settings_for_missing_element_is_read_error() {
    let tree = TempTree::new();
    let registry = ElementRegistry::new(tree.path());
    let err = registry.load_settings("Ghost").unwrap_err();
    assert!(matches!(err, SettingsError::Read { ref element, .. } if element == "Ghost"));
}
