//! Settings panel model.
//!
//! DESIGN
//! ======
//! Settings load asynchronously per selection, so a slow load for one
//! instance can land after the user has moved on. Every selection bumps a
//! generation counter and hands out a [`LoadTicket`]; a finished load is only
//! applied when its ticket still matches both the generation and the
//! selected instance id. Stale results are dropped.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::canvas::{CanvasAction, ElementInstance};
use crate::element::{ControlDefinition, ControlValue, Settings, SettingsError};

/// Length of the id prefix shown in the panel header.
const SHORT_ID_LEN: usize = 4;

/// Handle for one in-flight settings load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    instance_id: String,
    element_type: String,
}

impl LoadTicket {
    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

#[derive(Debug, Clone, PartialEq)]
enum LoadState {
    Idle,
    Loading,
    Ready(Settings),
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Loading,
    Ready,
    /// The descriptor failed to load; only the header is shown.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleInput {
    Color,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleField {
    pub key: String,
    pub label: String,
    pub input: StyleInput,
    pub value: String,
}

impl StyleField {
    /// Action applying an edited value to `instance_id`.
    #[must_use]
    pub fn edit(&self, instance_id: &str, value: &str) -> CanvasAction {
        CanvasAction::UpdateStyle {
            id: instance_id.to_owned(),
            styles: BTreeMap::from([(self.key.clone(), value.to_owned())]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlWidget {
    Dropdown { options: Vec<ControlValue> },
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlField {
    pub key: String,
    pub label: String,
    pub widget: ControlWidget,
    pub value: Value,
}

impl ControlField {
    /// Action applying an edited value to `instance_id`.
    ///
    /// Dropdowns report the option's display text; it is mapped back to the
    /// option itself so boolean and numeric options keep their JSON type.
    #[must_use]
    pub fn edit(&self, instance_id: &str, raw: &str) -> CanvasAction {
        let value = match &self.widget {
            ControlWidget::Dropdown { options } => options
                .iter()
                .find(|opt| opt.display() == raw)
                .map_or_else(|| Value::String(raw.to_owned()), ControlValue::to_json),
            ControlWidget::Text => Value::String(raw.to_owned()),
        };
        let mut settings = Map::new();
        settings.insert(self.key.clone(), value);
        CanvasAction::UpdateJsSetting { id: instance_id.to_owned(), settings }
    }

    /// Text shown in the input for the current value.
    #[must_use]
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub title: String,
    pub short_id: String,
    pub status: PanelStatus,
    pub styles: Vec<StyleField>,
    pub controls: Vec<ControlField>,
}

#[derive(Debug, Clone)]
pub struct SettingsPanel {
    generation: u64,
    selected: Option<String>,
    state: LoadState,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsPanel {
    #[must_use]
    pub fn new() -> Self {
        Self { generation: 0, selected: None, state: LoadState::Idle }
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    #[must_use]
    pub fn settings(&self) -> Option<&Settings> {
        match &self.state {
            LoadState::Ready(settings) => Some(settings),
            _ => None,
        }
    }

    /// Track a new selection. Returns the ticket for the load to start, or
    /// `None` when the selection was cleared.
    pub fn select(&mut self, instance: Option<&ElementInstance>) -> Option<LoadTicket> {
        self.generation += 1;
        let Some(instance) = instance else {
            self.selected = None;
            self.state = LoadState::Idle;
            return None;
        };
        self.selected = Some(instance.id.clone());
        self.state = LoadState::Loading;
        Some(LoadTicket {
            generation: self.generation,
            instance_id: instance.id.clone(),
            element_type: instance.element_type.clone(),
        })
    }

    /// Apply a finished load. Returns `false` when the ticket is stale.
    pub fn resolve(&mut self, ticket: &LoadTicket, result: Result<Settings, SettingsError>) -> bool {
        if ticket.generation != self.generation || self.selected.as_deref() != Some(ticket.instance_id.as_str()) {
            debug!(element_type = %ticket.element_type, "dropping stale settings load");
            return false;
        }
        self.state = match result {
            Ok(settings) => LoadState::Ready(settings),
            Err(e) => {
                warn!(element_type = %ticket.element_type, error = %e, "failed to load element settings");
                LoadState::Unavailable
            }
        };
        true
    }

    /// Fields for `instance` under the currently loaded settings.
    #[must_use]
    pub fn view(&self, instance: &ElementInstance) -> PanelView {
        let status = match self.state {
            LoadState::Ready(_) => PanelStatus::Ready,
            LoadState::Idle | LoadState::Loading => PanelStatus::Loading,
            LoadState::Unavailable => PanelStatus::Unavailable,
        };
        let (styles, controls) = match &self.state {
            LoadState::Ready(settings) if self.selected.as_deref() == Some(instance.id.as_str()) => {
                (style_fields(settings, instance), control_fields(settings, instance))
            }
            _ => (Vec::new(), Vec::new()),
        };
        PanelView {
            title: instance.element_type.clone(),
            short_id: instance.id.chars().take(SHORT_ID_LEN).collect(),
            status,
            styles,
            controls,
        }
    }
}

fn style_fields(settings: &Settings, instance: &ElementInstance) -> Vec<StyleField> {
    settings
        .allowed_styles
        .iter()
        .map(|key| StyleField {
            key: key.clone(),
            label: humanize(key),
            input: if key.to_ascii_lowercase().contains("color") { StyleInput::Color } else { StyleInput::Text },
            value: instance.styles.get(key).cloned().unwrap_or_default(),
        })
        .collect()
}

fn control_fields(settings: &Settings, instance: &ElementInstance) -> Vec<ControlField> {
    settings
        .controls()
        .iter()
        .map(|(key, control)| {
            let current = instance.js_settings.as_ref().and_then(|js| js.get(key)).cloned();
            let widget = match control {
                ControlDefinition::Select { options, .. } => ControlWidget::Dropdown { options: options.clone() },
                ControlDefinition::Text { .. } => ControlWidget::Text,
            };
            ControlField {
                key: key.clone(),
                label: control.label().to_owned(),
                widget,
                value: current.unwrap_or_else(|| control.default_value()),
            }
        })
        .collect()
}

/// `backgroundColor` -> `Background Color`.
pub(crate) fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
