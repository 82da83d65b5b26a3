//! Canvas state machine.
//!
//! DESIGN
//! ======
//! `Canvas` is a value: every transition borrows the current canvas and
//! returns a new one, leaving the old one untouched. That keeps undo/redo a
//! matter of keeping old values around. Transitions aimed at an unknown
//! instance id are no-ops rather than errors; the UI can race a removal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::element::ElementDefinition;

/// One placed occurrence of an element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
    #[serde(rename = "jsSettings", default, skip_serializing_if = "Option::is_none")]
    pub js_settings: Option<Map<String, Value>>,
}

impl ElementInstance {
    /// Fresh instance seeded from a definition's current defaults.
    #[must_use]
    pub fn from_definition(definition: &ElementDefinition) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            element_type: definition.name.clone(),
            styles: definition.settings.default_styles.clone(),
            js_settings: Some(definition.settings.control_defaults()),
        }
    }
}

/// Serialisable transitions, as sent by the editor UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CanvasAction {
    Select { id: String },
    ClearSelection,
    UpdateStyle { id: String, styles: BTreeMap<String, String> },
    UpdateJsSetting { id: String, settings: Map<String, Value> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canvas {
    instances: Vec<ElementInstance>,
    selected: Option<String>,
}

impl Canvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_instances(instances: Vec<ElementInstance>) -> Self {
        Self { instances, selected: None }
    }

    #[must_use]
    pub fn instances(&self) -> &[ElementInstance] {
        &self.instances
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ElementInstance> {
        let id = self.selected.as_deref()?;
        self.get(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ElementInstance> {
        self.instances.iter().find(|el| el.id == id)
    }

    /// Append a new instance of `definition`; returns the new canvas and id.
    ///
    /// Styles and JS settings are snapshots: later changes to the
    /// definition's defaults do not reach existing instances.
    #[must_use]
    pub fn add(&self, definition: &ElementDefinition) -> (Self, String) {
        let instance = ElementInstance::from_definition(definition);
        let id = instance.id.clone();
        let mut instances = self.instances.clone();
        instances.push(instance);
        (Self { instances, selected: self.selected.clone() }, id)
    }

    /// Select `id`. Unknown ids leave the canvas as it was.
    #[must_use]
    pub fn select(&self, id: &str) -> Self {
        if self.get(id).is_none() {
            return self.clone();
        }
        Self { instances: self.instances.clone(), selected: Some(id.to_owned()) }
    }

    #[must_use]
    pub fn clear_selection(&self) -> Self {
        Self { instances: self.instances.clone(), selected: None }
    }

    /// Merge `partial` into the styles of instance `id` only.
    #[must_use]
    pub fn update_style(&self, id: &str, partial: &BTreeMap<String, String>) -> Self {
        self.map_instance(id, |el| {
            let mut styles = el.styles.clone();
            styles.extend(partial.iter().map(|(k, v)| (k.clone(), v.clone())));
            ElementInstance { styles, ..el.clone() }
        })
    }

    /// Merge `partial` into the JS settings of instance `id` only.
    #[must_use]
    pub fn update_js_setting(&self, id: &str, partial: &Map<String, Value>) -> Self {
        self.map_instance(id, |el| {
            let mut settings = el.js_settings.clone().unwrap_or_default();
            settings.extend(partial.iter().map(|(k, v)| (k.clone(), v.clone())));
            ElementInstance { js_settings: Some(settings), ..el.clone() }
        })
    }

    #[must_use]
    pub fn apply(&self, action: &CanvasAction) -> Self {
        match action {
            CanvasAction::Select { id } => self.select(id),
            CanvasAction::ClearSelection => self.clear_selection(),
            CanvasAction::UpdateStyle { id, styles } => self.update_style(id, styles),
            CanvasAction::UpdateJsSetting { id, settings } => self.update_js_setting(id, settings),
        }
    }

    /// Instance list as the export endpoint expects it.
    #[must_use]
    pub fn to_export_payload(&self) -> Value {
        serde_json::json!({ "elements": self.instances })
    }

    fn map_instance<F>(&self, id: &str, f: F) -> Self
    where
        F: Fn(&ElementInstance) -> ElementInstance,
    {
        let instances = self
            .instances
            .iter()
            .map(|el| if el.id == id { f(el) } else { el.clone() })
            .collect();
        Self { instances, selected: self.selected.clone() }
    }
}

#[cfg(test)]
#[path = "canvas_test.rs"]
mod tests;
