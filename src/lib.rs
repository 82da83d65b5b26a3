//! Pagesmith: tooling behind the visual page builder.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser editor places element instances on a canvas and posts them to
//! the export server. This crate owns everything outside the browser: the
//! element registry on disk, the generated manifest the palette reads, the
//! export pipeline that turns an instance list into a zipped static site, and
//! the HTTP surface in front of it. The canvas state machine and settings
//! panel model live here too so their semantics are testable without a DOM.

pub mod config;
pub mod editor;
pub mod element;
pub mod error;
pub mod export;
pub mod manifest;
pub mod routes;
pub mod state;
