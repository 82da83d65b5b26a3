//! Editor model: canvas state and the settings panel bound to it.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser owns rendering; this module owns the semantics. The canvas
//! is an immutable value replaced on every transition, and the panel derives
//! its controls from the selected instance plus that element's settings.

pub mod canvas;
pub mod panel;

pub use canvas::{Canvas, CanvasAction, ElementInstance};
pub use panel::{ControlField, ControlWidget, LoadTicket, PanelStatus, PanelView, SettingsPanel, StyleField, StyleInput};
