use std::collections::HashMap;
use std::path::Path;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let env: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    AppConfig::from_lookup(Path::new("/work/site"), |key| env.get(key).cloned())
}

#[test]
fn defaults_follow_project_conventions() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(cfg.layout.elements_dir, Path::new("/work/site/src/elements"));
    assert_eq!(cfg.layout.global_styles, Path::new("/work/site/src/styles.css"));
    assert_eq!(cfg.layout.interfaces_dir, Path::new("/work/site/src/interfaces"));
    assert_eq!(cfg.layout.manifest_path, Path::new("/work/site/src/utils/elementManifest.ts"));
    assert_eq!(cfg.export.cleanup, CleanupPolicy::Keep);
    assert_eq!(cfg.export.body_limit_bytes, DEFAULT_BODY_LIMIT_BYTES);
    assert_eq!(cfg.export.npm_bin, "npm");
    assert_eq!(cfg.export.build_timeout, Duration::from_secs(DEFAULT_BUILD_TIMEOUT_SECS));
    assert_eq!(cfg.export.work_root, std::env::temp_dir());
    assert!(cfg.watch_manifest);
}

#[test]
fn project_root_moves_every_default_path() {
    let cfg = config_from(&[("PROJECT_ROOT", "/srv/editor")]).unwrap();
    assert_eq!(cfg.layout, SourceLayout::under(Path::new("/srv/editor")));
}

#[test]
fn explicit_paths_override_root() {
    let cfg = config_from(&[
        ("PROJECT_ROOT", "/srv/editor"),
        ("ELEMENTS_DIR", "/opt/elements"),
        ("MANIFEST_PATH", "/tmp/manifest.ts"),
    ])
    .unwrap();
    assert_eq!(cfg.layout.elements_dir, Path::new("/opt/elements"));
    assert_eq!(cfg.layout.manifest_path, Path::new("/tmp/manifest.ts"));
    assert_eq!(cfg.layout.interfaces_dir, Path::new("/srv/editor/src/interfaces"));
}

#[test]
fn parses_export_overrides() {
    let cfg = config_from(&[
        ("PORT", "4000"),
        ("EXPORT_CLEANUP", "on_success"),
        ("EXPORT_BODY_LIMIT_BYTES", "2048"),
        ("EXPORT_WORK_ROOT", "/var/exports"),
        ("NPM_BIN", "pnpm"),
        ("BUILD_TIMEOUT_SECS", "30"),
        ("WATCH_MANIFEST", "false"),
    ])
    .unwrap();
    assert_eq!(cfg.port, 4000);
    assert_eq!(cfg.export.cleanup, CleanupPolicy::OnSuccess);
    assert_eq!(cfg.export.body_limit_bytes, 2048);
    assert_eq!(cfg.export.work_root, Path::new("/var/exports"));
    assert_eq!(cfg.export.npm_bin, "pnpm");
    assert_eq!(cfg.export.build_timeout, Duration::from_secs(30));
    assert!(!cfg.watch_manifest);
}

#[test]
fn malformed_numbers_fall_back_to_defaults() {
    let cfg = config_from(&[("PORT", "not-a-port"), ("BUILD_TIMEOUT_SECS", "-5")]).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.export.build_timeout, Duration::from_secs(DEFAULT_BUILD_TIMEOUT_SECS));
}

#[test]
fn unknown_cleanup_policy_errors() {
    let err = config_from(&[("EXPORT_CLEANUP", "sometimes")]).unwrap_err();
    assert!(matches!(err, ConfigError::CleanupPolicy(ref v) if v == "sometimes"));
    assert!(err.to_string().contains("unknown EXPORT_CLEANUP"));
}

#[test]
fn malformed_bool_errors() {
    let err = config_from(&[("WATCH_MANIFEST", "maybe")]).unwrap_err();
    assert!(matches!(err, ConfigError::Bool { key: "WATCH_MANIFEST", .. }));
}
