//! Runtime configuration parsed from environment variables.
//!
//! Parsing goes through a lookup closure so tests can feed a fixed map
//! instead of mutating the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::export::workdir::CleanupPolicy;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_NPM_BIN: &str = "npm";
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown EXPORT_CLEANUP value: {0} (expected keep, on_success, or always)")]
    CleanupPolicy(String),
    #[error("invalid boolean for {key}: {value}")]
    Bool { key: &'static str, value: String },
    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CleanupPolicy(_) => "E_CONFIG_CLEANUP",
            Self::Bool { .. } => "E_CONFIG_BOOL",
            Self::CurrentDir(_) => "E_CONFIG_CWD",
        }
    }
}

/// Where the editor project keeps the inputs the exporter reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    /// One directory per Element Definition.
    pub elements_dir: PathBuf,
    /// Shared global style sheet copied into every export.
    pub global_styles: PathBuf,
    /// Shared type interfaces copied into every export.
    pub interfaces_dir: PathBuf,
    /// Generated manifest consumed by the editor palette.
    pub manifest_path: PathBuf,
}

impl SourceLayout {
    /// Conventional layout below a project root.
    #[must_use]
    pub fn under(root: &std::path::Path) -> Self {
        let src = root.join("src");
        Self {
            elements_dir: src.join("elements"),
            global_styles: src.join("styles.css"),
            interfaces_dir: src.join("interfaces"),
            manifest_path: src.join("utils").join("elementManifest.ts"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub work_root: PathBuf,
    pub cleanup: CleanupPolicy,
    pub body_limit_bytes: usize,
    pub npm_bin: String,
    pub build_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub layout: SourceLayout,
    pub export: ExportSettings,
    pub watch_manifest: bool,
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown cleanup policy, a malformed boolean,
    /// or when the working directory cannot be resolved.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()?;
        Self::from_lookup(&cwd, |key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// Optional:
    /// - `PORT` (3001), `BIND_ADDR` (`0.0.0.0`)
    /// - `PROJECT_ROOT` (current dir) and the per-path overrides
    ///   `ELEMENTS_DIR`, `GLOBAL_STYLES_PATH`, `INTERFACES_DIR`, `MANIFEST_PATH`
    /// - `EXPORT_WORK_ROOT` (OS temp dir), `EXPORT_CLEANUP` (`keep`)
    /// - `EXPORT_BODY_LIMIT_BYTES` (10 MiB), `NPM_BIN` (`npm`),
    ///   `BUILD_TIMEOUT_SECS` (600), `WATCH_MANIFEST` (`true`)
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown cleanup policy or a malformed boolean.
    pub fn from_lookup<F>(cwd: &std::path::Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup("PROJECT_ROOT").map_or_else(|| cwd.to_path_buf(), PathBuf::from);
        let defaults = SourceLayout::under(&root);
        let path_or = |key: &str, default: PathBuf| lookup(key).map_or(default, PathBuf::from);

        let layout = SourceLayout {
            elements_dir: path_or("ELEMENTS_DIR", defaults.elements_dir),
            global_styles: path_or("GLOBAL_STYLES_PATH", defaults.global_styles),
            interfaces_dir: path_or("INTERFACES_DIR", defaults.interfaces_dir),
            manifest_path: path_or("MANIFEST_PATH", defaults.manifest_path),
        };

        let export = ExportSettings {
            work_root: path_or("EXPORT_WORK_ROOT", std::env::temp_dir()),
            cleanup: parse_cleanup(lookup("EXPORT_CLEANUP").as_deref())?,
            body_limit_bytes: parse_or(lookup("EXPORT_BODY_LIMIT_BYTES"), DEFAULT_BODY_LIMIT_BYTES),
            npm_bin: lookup("NPM_BIN").unwrap_or_else(|| DEFAULT_NPM_BIN.to_owned()),
            build_timeout: Duration::from_secs(parse_or(lookup("BUILD_TIMEOUT_SECS"), DEFAULT_BUILD_TIMEOUT_SECS)),
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            port: parse_or(lookup("PORT"), DEFAULT_PORT),
            layout,
            export,
            watch_manifest: parse_bool("WATCH_MANIFEST", lookup("WATCH_MANIFEST").as_deref(), true)?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_cleanup(raw: Option<&str>) -> Result<CleanupPolicy, ConfigError> {
    match raw.unwrap_or("keep") {
        "keep" => Ok(CleanupPolicy::Keep),
        "on_success" => Ok(CleanupPolicy::OnSuccess),
        "always" => Ok(CleanupPolicy::Always),
        other => Err(ConfigError::CleanupPolicy(other.to_owned())),
    }
}

fn parse_bool(key: &'static str, raw: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    match raw.map(str::trim) {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::Bool { key, value: other.to_owned() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
