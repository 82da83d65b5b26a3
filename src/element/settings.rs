//! Settings descriptor: which styles an element exposes and which
//! behavioural controls it accepts.
//!
//! Wire shape (camelCase, as authored in `settings.json`):
//!
//! ```json
//! {
//!   "allowedStyles": ["color", "backgroundColor"],
//!   "defaultStyles": { "color": "#000000" },
//!   "javascript": { "controls": {
//!     "isOpen": { "type": "select", "label": "Is Open", "options": ["true", "false"], "defaultValue": "false" }
//!   } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings for {element}: {source}")]
    Read {
        element: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings for {element}: {source}")]
    Parse {
        element: String,
        #[source]
        source: serde_json::Error,
    },
}

impl crate::error::ErrorCode for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "E_SETTINGS_READ",
            Self::Parse { .. } => "E_SETTINGS_PARSE",
        }
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Style properties the panel exposes, in display order.
    pub allowed_styles: Vec<String>,
    /// Seed values copied into every new instance.
    #[serde(default)]
    pub default_styles: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javascript: Option<JavascriptSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavascriptSettings {
    #[serde(default)]
    pub controls: Controls,
}

impl Settings {
    /// Parse a descriptor from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Parse` when the text does not match the settings shape.
    pub fn from_json(element: &str, text: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(text).map_err(|source| SettingsError::Parse { element: element.to_owned(), source })
    }

    /// Declared controls, empty when the element has no behavioural settings.
    #[must_use]
    pub fn controls(&self) -> &[(String, ControlDefinition)] {
        self.javascript.as_ref().map_or(&[], |js| js.controls.as_slice())
    }

    /// Snapshot of every control's default value keyed by control name.
    #[must_use]
    pub fn control_defaults(&self) -> Map<String, Value> {
        self.controls()
            .iter()
            .map(|(key, control)| (key.clone(), control.default_value()))
            .collect()
    }

    /// Whether `key` is one of the declared style properties.
    #[must_use]
    pub fn allows_style(&self, key: &str) -> bool {
        self.allowed_styles.iter().any(|s| s == key)
    }
}

// =============================================================================
// CONTROLS
// =============================================================================

/// Scalar accepted by select controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl ControlValue {
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Text shown in a dropdown for this option.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlDefinition {
    Select {
        label: String,
        options: Vec<ControlValue>,
        #[serde(rename = "defaultValue")]
        default_value: ControlValue,
    },
    Text {
        label: String,
        #[serde(rename = "defaultValue", default)]
        default_value: String,
    },
}

impl ControlDefinition {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Select { label, .. } | Self::Text { label, .. } => label,
        }
    }

    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Select { default_value, .. } => default_value.to_json(),
            Self::Text { default_value, .. } => Value::String(default_value.clone()),
        }
    }
}

/// Control definitions in declaration order.
///
/// Serialised as a JSON object; the panel renders controls in the order the
/// element author wrote them, so a sorted map would not do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Controls(Vec<(String, ControlDefinition)>);

impl Controls {
    #[must_use]
    pub fn new(entries: Vec<(String, ControlDefinition)>) -> Self {
        Self(entries)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[(String, ControlDefinition)] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ControlDefinition> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }
}

impl Serialize for Controls {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, control) in &self.0 {
            map.serialize_entry(key, control)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Controls {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ControlsVisitor;

        impl<'de> Visitor<'de> for ControlsVisitor {
            type Value = Controls;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of control name to control definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Controls, A::Error> {
                let mut entries: Vec<(String, ControlDefinition)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, control)) = access.next_entry::<String, ControlDefinition>()? {
                    // Later duplicates win, matching object-literal semantics.
                    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                        slot.1 = control;
                    } else {
                        entries.push((key, control));
                    }
                }
                Ok(Controls(entries))
            }
        }

        deserializer.deserialize_map(ControlsVisitor)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
