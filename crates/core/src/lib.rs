//! OpenLabel core library.
//!
//! Turns a label template into a command stream ready for a specific printer.
//! The two stages are [`template::render`], which resolves conditional blocks
//! and placeholders, and [`scale::scale_commands`], which rewrites geometry
//! parameters for a different printhead resolution. [`prepare`] runs both.

#![warn(missing_docs)]

/// Resolution scaling of ZPL command streams.
pub mod scale;
/// Template expansion: conditional blocks and placeholders.
pub mod template;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use scale::{Resolution, SCALING_TABLE, ScaleFactor, ScaleSpec, scale_command, scale_commands};
pub use template::{
    Placeholders, TemplateError, TemplateErrorKind, parse_conditionals, render,
    replace_placeholders,
};

/// Render a template, then scale the result from `resolution.source` to
/// `resolution.target` dpi.
///
/// Scaling always runs, even at a factor of 1, so the output is normalised
/// the same way regardless of the resolutions involved.
pub fn prepare(
    template: &str,
    placeholders: &Placeholders,
    resolution: Resolution,
) -> Result<String, TemplateError> {
    let rendered = render(template, placeholders)?;
    Ok(scale_commands(
        &rendered,
        resolution.source,
        resolution.target,
    ))
}
