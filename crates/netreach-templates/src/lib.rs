//! # NetReach Templates
//!
//! Pure, stateless rendering of connection notes and messages: a fixed
//! variable vocabulary substituted into `{{Var}}` placeholders, whitespace
//! normalization, and per-template length limits. Connection notes and
//! direct messages carry limits two orders of magnitude apart, so the
//! limit lives on the template, never in the renderer.

pub mod catalog;
pub mod render;
pub mod vars;

pub use catalog::{
    connection_note_templates, message_templates, template_by_id, templates_by_kind,
    MessageTemplate, TemplateKind, CONNECTION_NOTE_MAX_LEN, MESSAGE_MAX_LEN, SUBJECT_MAX_LEN,
};
pub use render::{cleanup_whitespace, render, render_subject, truncate_with_ellipsis, validate_length};
pub use vars::TemplateVars;
