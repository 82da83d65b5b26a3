//! `new-element` scaffolding: creates a starter element directory.
//!
//! The element name is normalised three ways: `PascalCase` for the directory
//! and component, `kebab-case` for the style module file and CSS class, and
//! `camelCase` for the class key (exports use `camelCaseOnly` CSS modules).
//! Existing files are never overwritten; they are reported and skipped.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{ENTRY_FILE, SETTINGS_FILE, SETTINGS_MODULE_FILE, is_safe_type_name};

#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    #[error("invalid element name: {0:?}")]
    InvalidName(String),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl crate::error::ErrorCode for ScaffoldError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidName(_) => "E_SCAFFOLD_NAME",
            Self::Io { .. } => "E_SCAFFOLD_IO",
        }
    }
}

/// The three spellings derived from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNames {
    pub pascal: String,
    pub kebab: String,
    pub camel: String,
}

impl ElementNames {
    /// Normalise `raw` (`my-button`, `my_button`, `MyButton`, ...).
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for blank input or characters outside
    /// `[A-Za-z0-9_-]` once normalised.
    pub fn parse(raw: &str) -> Result<Self, ScaffoldError> {
        let trimmed = raw.trim();
        let pascal: String = trimmed
            .split(['-', '_', ' '])
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect();
        if !is_safe_type_name(&pascal) {
            return Err(ScaffoldError::InvalidName(raw.to_owned()));
        }

        let mut kebab = String::with_capacity(pascal.len() + 4);
        for (i, c) in pascal.chars().enumerate() {
            if c.is_ascii_uppercase() {
                if i > 0 {
                    kebab.push('-');
                }
                kebab.push(c.to_ascii_lowercase());
            } else {
                kebab.push(c);
            }
        }

        let mut chars = pascal.chars();
        let camel = chars
            .next()
            .map(|first| first.to_ascii_lowercase().to_string() + chars.as_str())
            .unwrap_or_default();

        Ok(Self { pascal, kebab, camel })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub dir: PathBuf,
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Create `<elements_dir>/<Pascal>/` with renderer, settings, and styles.
///
/// # Errors
///
/// Returns `InvalidName` for an unusable name and `Io` when a directory or
/// file cannot be written.
pub fn create_element(elements_dir: &Path, raw_name: &str) -> Result<ScaffoldReport, ScaffoldError> {
    let names = ElementNames::parse(raw_name)?;
    info!(element = %names.pascal, input = %raw_name, "creating element");

    let dir = elements_dir.join(&names.pascal);
    if dir.exists() {
        warn!(path = %dir.display(), "directory already exists");
    } else {
        std::fs::create_dir_all(&dir).map_err(|source| ScaffoldError::Io { path: dir.clone(), source })?;
        info!(path = %dir.display(), "created directory");
    }

    let files = [
        (ENTRY_FILE.to_owned(), index_template(&names)),
        (SETTINGS_FILE.to_owned(), SETTINGS_TEMPLATE.to_owned()),
        (SETTINGS_MODULE_FILE.to_owned(), SETTINGS_MODULE_TEMPLATE.to_owned()),
        (format!("{}.module.scss", names.kebab), styles_template(&names)),
    ];

    let mut report = ScaffoldReport { dir: dir.clone(), ..ScaffoldReport::default() };
    for (file_name, contents) in files {
        let path = dir.join(file_name);
        if path.exists() {
            warn!(path = %path.display(), "file already exists");
            report.skipped.push(path);
            continue;
        }
        std::fs::write(&path, contents).map_err(|source| ScaffoldError::Io { path: path.clone(), source })?;
        info!(path = %path.display(), "created file");
        report.created.push(path);
    }

    Ok(report)
}

// =============================================================================
// TEMPLATES
// =============================================================================

fn index_template(names: &ElementNames) -> String {
    let ElementNames { pascal, kebab, camel } = names;
    format!(
        "import React from 'react';
import styles from './{kebab}.module.scss';

export interface {pascal}Props {{
  message?: string;
}}

export const {pascal}: React.FC<{pascal}Props> = ({{ message = 'Hello from {pascal}' }}) => {{
  return <div className={{styles.{camel}}}>{{message}}</div>;
}};

export default {pascal};
"
    )
}

const SETTINGS_TEMPLATE: &str = r##"{
  "allowedStyles": ["color", "backgroundColor", "fontSize"],
  "defaultStyles": {
    "color": "#000000",
    "backgroundColor": "#ffffff",
    "fontSize": "1rem"
  }
}
"##;

const SETTINGS_MODULE_TEMPLATE: &str = "import descriptor from './settings.json';

export const settings = descriptor;

export default settings;
";

fn styles_template(names: &ElementNames) -> String {
    format!(
        ".{} {{
  padding: 1rem;
  border: 1px solid #ccc;
  border-radius: 4px;
}}
",
        names.kebab
    )
}

#[cfg(test)]
#[path = "scaffold_test.rs"]
mod tests;
