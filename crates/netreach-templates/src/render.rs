//! Placeholder substitution and whitespace normalization.
//!
//! Bodies render strictly: an unresolved placeholder, an empty result, or
//! an over-limit result is an error. Subjects degrade gracefully instead,
//! falling back to the raw template text and truncating with an ellipsis.

use netreach_core::error::{NetreachError, Result};

use crate::catalog::{MessageTemplate, TemplateKind, CONNECTION_NOTE_MAX_LEN, MESSAGE_MAX_LEN, SUBJECT_MAX_LEN};
use crate::vars::TemplateVars;

/// Render a template body. Fails on unresolved placeholders, an empty
/// result after cleanup, or a result over the template's own limit.
pub fn render(template: &MessageTemplate, vars: &TemplateVars) -> Result<String> {
    let vars = vars.normalized();
    let substituted = substitute(template.body, &vars);

    if let Some(name) = residual_placeholder(&substituted) {
        return Err(NetreachError::UnknownVariable(name));
    }

    let result = cleanup_whitespace(&substituted);
    if result.is_empty() {
        return Err(NetreachError::EmptyRender);
    }
    if result.len() > template.max_len {
        return Err(NetreachError::RenderTooLong {
            actual: result.len(),
            max: template.max_len,
        });
    }

    tracing::debug!("rendered template '{}' ({} characters)", template.name, result.len());
    Ok(result)
}

/// Render a subject line. Never errors: an unresolved placeholder falls
/// back to the raw template text, and over-long results are truncated to
/// the subject ceiling with an ellipsis.
pub fn render_subject(subject_template: &str, vars: &TemplateVars) -> String {
    let vars = vars.normalized();
    let substituted = substitute(subject_template, &vars);

    let result = if residual_placeholder(&substituted).is_some() {
        tracing::warn!("subject template has unresolved placeholders, using raw text");
        subject_template.to_string()
    } else {
        substituted
    };

    truncate_with_ellipsis(result.trim(), SUBJECT_MAX_LEN)
        .trim()
        .to_string()
}

/// Check a rendered text against the limit for its template kind.
pub fn validate_length(text: &str, kind: TemplateKind) -> Result<()> {
    if text.is_empty() {
        return Err(NetreachError::EmptyRender);
    }
    let max = match kind {
        TemplateKind::ConnectionNote => CONNECTION_NOTE_MAX_LEN,
        _ => MESSAGE_MAX_LEN,
    };
    if text.len() > max {
        return Err(NetreachError::RenderTooLong {
            actual: text.len(),
            max,
        });
    }
    Ok(())
}

/// Collapse runs of spaces, trim each line, and collapse 3+ consecutive
/// newlines to 2. Idempotent: cleaning already-clean text is a no-op.
pub fn cleanup_whitespace(text: &str) -> String {
    let mut text: String = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    while text.contains("  ") {
        text = text.replace("  ", " ");
    }
    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }
    text.trim().to_string()
}

/// Truncate to at most `max_len` bytes, appending `...` when cut. The cut
/// point walks back to a character boundary so multi-byte text cannot
/// split mid-character.
pub fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

fn substitute(text: &str, vars: &TemplateVars) -> String {
    let mut out = text.to_string();
    for (placeholder, value) in vars.pairs() {
        if out.contains(placeholder) {
            out = out.replace(placeholder, value);
        }
    }
    out
}

/// The name of the first `{{...}}` left in the text, if any.
fn residual_placeholder(text: &str) -> Option<String> {
    let start = text.find("{{")?;
    let rest = &text[start + 2..];
    let end = rest.find("}}")?;
    Some(rest[..end].to_string())
}
