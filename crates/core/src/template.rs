//! Label template expansion.
//!
//! Templates are plain ZPL with two extensions:
//!
//! - conditional blocks, `{{IF NAME}}...{{ENDIF}}`, kept only when `NAME` is a
//!   key of the placeholder context (the value is ignored);
//! - placeholders, where every literal occurrence of a context key is replaced
//!   by its value.
//!
//! Conditionals are resolved first, then placeholders are substituted. Blocks
//! do not nest.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Opening marker of a conditional block (note the trailing space).
pub const IF_OPEN: &str = "{{IF ";
/// Closing marker of a conditional header.
pub const CONDITION_CLOSE: &str = "}}";
/// End marker of a conditional block.
pub const ENDIF: &str = "{{ENDIF}}";

/// Placeholder context: key → replacement value.
///
/// Keys double as condition names for `{{IF ...}}` blocks. Ordered by key so
/// that ties between equally long keys break the same way on every run.
pub type Placeholders = BTreeMap<String, String>;

/// A failure while expanding a template.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// An `{{IF ...}}` block has no `{{ENDIF}}` after it.
    #[error("invalid template: missing {{{{ENDIF}}}}")]
    MissingEndif {
        /// Byte offset of the `{{IF ` marker in the original template, when it
        /// can be located there.
        offset: Option<usize>,
    },

    /// The `{{IF ...` header is not closed by `}}` before its `{{ENDIF}}`.
    #[error("invalid template: malformed {{{{IF}}}} condition")]
    MalformedCondition {
        /// Byte offset of the `{{IF ` marker in the original template, when it
        /// can be located there.
        offset: Option<usize>,
    },
}

/// Machine-readable kind of a [`TemplateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateErrorKind {
    /// See [`TemplateError::MissingEndif`].
    MissingEndif,
    /// See [`TemplateError::MalformedCondition`].
    MalformedCondition,
}

impl TemplateError {
    /// The error kind, without position information.
    pub fn kind(&self) -> TemplateErrorKind {
        match self {
            TemplateError::MissingEndif { .. } => TemplateErrorKind::MissingEndif,
            TemplateError::MalformedCondition { .. } => TemplateErrorKind::MalformedCondition,
        }
    }

    /// Byte offset of the offending `{{IF ` marker in the original template.
    pub fn offset(&self) -> Option<usize> {
        match self {
            TemplateError::MissingEndif { offset }
            | TemplateError::MalformedCondition { offset } => *offset,
        }
    }
}

/// Expand a template: resolve conditional blocks, then substitute placeholders.
///
/// Unknown placeholders are left in the output as written.
///
/// ```
/// use openlabel_core::template::{Placeholders, render};
///
/// let mut ctx = Placeholders::new();
/// ctx.insert("X".into(), "v".into());
/// assert_eq!(render("{{IF X}}A{{ENDIF}}B", &ctx).unwrap(), "AB");
/// assert_eq!(render("{{IF X}}A{{ENDIF}}B", &Placeholders::new()).unwrap(), "B");
/// ```
pub fn render(template: &str, placeholders: &Placeholders) -> Result<String, TemplateError> {
    let resolved = parse_conditionals(template, placeholders)?;
    Ok(replace_placeholders(&resolved, placeholders))
}

/// Resolve every `{{IF NAME}}...{{ENDIF}}` block, left to right.
///
/// A block whose condition is a key of `placeholders` is replaced by its body;
/// any other block is removed entirely. Scanning resumes where the replaced
/// block started, so a kept body is itself scanned for further `{{IF `
/// markers. Returns the first error encountered.
pub fn parse_conditionals(
    template: &str,
    placeholders: &Placeholders,
) -> Result<String, TemplateError> {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template.to_owned();

    while let Some(start) = rest.find(IF_OPEN) {
        let Some(endif) = find_from(&rest, ENDIF, start) else {
            return Err(TemplateError::MissingEndif {
                offset: original_offset(template, &rest[start..]),
            });
        };
        let close = match find_from(&rest, CONDITION_CLOSE, start) {
            Some(close) if close <= endif => close,
            _ => {
                return Err(TemplateError::MalformedCondition {
                    offset: original_offset(template, &rest[start..]),
                });
            }
        };

        let condition = rest[start + IF_OPEN.len()..close].trim();
        let body = &rest[close + CONDITION_CLOSE.len()..endif];
        let keep = placeholders.contains_key(condition);
        debug!(condition, keep, "resolved conditional block");

        let mut next = String::with_capacity(rest.len() - start);
        if keep {
            next.push_str(body);
        }
        next.push_str(&rest[endif + ENDIF.len()..]);

        resolved.push_str(&rest[..start]);
        rest = next;
    }

    resolved.push_str(&rest);
    Ok(resolved)
}

/// Replace every literal occurrence of each key with its value.
///
/// The text is scanned once, left to right. At each position the longest
/// matching key wins (ties go to the smaller key), its value is copied to the
/// output, and scanning resumes after the matched key. Inserted values are
/// never scanned again, by any key. Empty keys are ignored.
pub fn replace_placeholders(template: &str, placeholders: &Placeholders) -> String {
    let mut keys: Vec<(&str, &str)> = placeholders
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    if keys.is_empty() {
        return template.to_owned();
    }
    // Stable sort keeps ascending key order among keys of equal length.
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while let Some(ch) = rest.chars().next() {
        for &(key, value) in &keys {
            if let Some(after) = rest.strip_prefix(key) {
                out.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Parse a `KEY=VALUE` assignment into a placeholder entry.
///
/// Splits on the first `=`, so values may contain `=`. Returns `None` when
/// there is no `=` or the key is empty.
pub fn parse_assignment(s: &str) -> Option<(String, String)> {
    let (key, value) = s.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key.to_owned(), value.to_owned()))
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack[from..].find(needle).map(|i| from + i)
}

/// Locate `tail` in the original template when it is an untouched suffix of it.
fn original_offset(template: &str, tail: &str) -> Option<usize> {
    template
        .ends_with(tail)
        .then(|| template.len() - tail.len())
}
