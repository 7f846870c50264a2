//! Terminal and JSON reporting for CLI results and failures.
//!
//! Template errors are rendered with ariadne, pointing at the offending
//! `{{IF` marker in the source. Everything else becomes a one-line message
//! on stderr, or a JSON envelope on stdout when `--output json` is active.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use openlabel_core::TemplateError;
use openlabel_core::template::IF_OPEN;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for status and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne) on stderr.
    Pretty,
    /// Machine-readable JSON on stdout.
    Json,
}

impl Format {
    /// Use the explicit choice, or pick pretty for terminals and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stderr().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Template errors ─────────────────────────────────────────────────────

/// Report a template expansion failure in the given format.
pub(crate) fn render_template_error(
    source: &str,
    filename: &str,
    err: &TemplateError,
    format: Format,
) {
    match format {
        Format::Pretty => render_template_error_pretty(source, filename, err),
        Format::Json => {
            let out = serde_json::json!({
                "success": false,
                "error": err.kind(),
                "message": err.to_string(),
                "file": filename,
                "offset": err.offset(),
            });
            print_json(&out);
        }
    }
}

fn render_template_error_pretty(source: &str, filename: &str, err: &TemplateError) {
    let Some(offset) = err.offset() else {
        eprintln!("{}: {err}", "error".fg(Color::Red));
        return;
    };

    // Clamp the span so truncated input cannot panic the renderer.
    let start = offset.min(source.len());
    let end = (offset + IF_OPEN.len()).min(source.len()).max(start);

    let label = match err {
        TemplateError::MissingEndif { .. } => "this block is never closed by {{ENDIF}}",
        _ => "the condition is not closed by }} before {{ENDIF}}",
    };

    let mut cache = (filename, Source::from(source));
    Report::build(ReportKind::Error, (filename, start..end))
        .with_config(Config::default().with_compact(false))
        .with_message(err.to_string())
        .with_label(
            Label::new((filename, start..end))
                .with_message(label)
                .with_color(Color::Red),
        )
        .with_note("conditional blocks cannot be nested")
        .finish()
        .eprint(&mut cache)
        .ok();
}

// ── Generic failures ────────────────────────────────────────────────────

/// Report a command failure (I/O, configuration, transport).
pub(crate) fn render_command_error(err: &anyhow::Error, format: Format) {
    match format {
        Format::Pretty => {
            eprintln!("{}: {err:#}", "error".fg(Color::Red));
        }
        Format::Json => {
            let out = serde_json::json!({
                "success": false,
                "error": "command_failed",
                "message": format!("{err:#}"),
            });
            print_json(&out);
        }
    }
}

/// Print a JSON value to stdout, pretty-printed.
pub(crate) fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("error: failed to serialize output: {e}"),
    }
}
