//! Resolution scaling for ZPL command streams.
//!
//! A label authored for one printhead resolution (e.g. 203 dpi) prints at the
//! wrong size on a device with another resolution (e.g. 300 dpi). This module
//! rewrites the geometry parameters of a fixed set of commands so that the
//! label keeps its physical dimensions.
//!
//! The scaler is total: unknown commands and non-numeric parameters pass
//! through unchanged, and no input is ever rejected.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Command prefix character.
pub const COMMAND_PREFIX: char = '^';
/// Parameter separator within a command.
pub const PARAM_SEPARATOR: char = ',';

/// How many leading parameters of a command carry geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scale", content = "count")]
pub enum ScaleSpec {
    /// Every parameter is scaled.
    All,
    /// Only the first `n` parameters are scaled.
    Leading(usize),
}

/// Commands whose parameters are rewritten, with how many of them.
pub static SCALING_TABLE: &[(&str, ScaleSpec)] = &[
    ("FO", ScaleSpec::Leading(2)),
    ("PW", ScaleSpec::All),
    ("FT", ScaleSpec::Leading(2)),
    ("A0", ScaleSpec::All),
    ("A1", ScaleSpec::All),
    ("A2", ScaleSpec::All),
    ("A3", ScaleSpec::All),
    ("A4", ScaleSpec::All),
    ("A5", ScaleSpec::All),
    ("A6", ScaleSpec::All),
    ("A7", ScaleSpec::All),
    ("A8", ScaleSpec::All),
    ("A9", ScaleSpec::All),
    ("A@", ScaleSpec::All),
    ("LL", ScaleSpec::All),
    ("LH", ScaleSpec::All),
    ("GB", ScaleSpec::All),
    ("FB", ScaleSpec::All),
    ("BY", ScaleSpec::All),
    ("BQ", ScaleSpec::Leading(3)),
    ("B3", ScaleSpec::All),
    ("BC", ScaleSpec::All),
    ("B7", ScaleSpec::Leading(2)),
];

/// Look up the scaling rule for a two-character command code.
pub fn scale_spec(code: &str) -> Option<ScaleSpec> {
    SCALING_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, spec)| *spec)
}

/// Source and target printhead resolutions in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Resolution the command stream was authored for.
    pub source: u32,
    /// Resolution of the device that will print it.
    pub target: u32,
}

impl Resolution {
    /// Build a resolution pair.
    pub fn new(source: u32, target: u32) -> Self {
        Self { source, target }
    }

    /// The scale factor for this pair.
    pub fn factor(&self) -> ScaleFactor {
        ScaleFactor::new(self.source, self.target)
    }
}

/// Multiplier applied to geometry parameters: `target / source`, rounded to
/// two decimal places with midpoints away from zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Compute the factor for converting `source` dpi to `target` dpi.
    ///
    /// A zero `source` yields a non-finite factor; [`scale_command`] then leaves
    /// every parameter unchanged.
    pub fn new(source: u32, target: u32) -> Self {
        let ratio = f64::from(target) / f64::from(source);
        Self((ratio * 100.0).round() / 100.0)
    }

    /// The raw multiplier.
    pub fn value(self) -> f64 {
        self.0
    }

    /// `true` when scaling leaves integer parameters unchanged.
    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }

    /// Scale a single numeric value, rounding midpoints away from zero.
    ///
    /// Returns `None` when the product is not finite.
    pub fn apply(self, value: f64) -> Option<f64> {
        let scaled = (value * self.0).round();
        if !scaled.is_finite() {
            return None;
        }
        // Normalise -0 so it prints as "0".
        Some(if scaled == 0.0 { 0.0 } else { scaled })
    }
}

/// Rewrite a command stream from `source` dpi to `target` dpi.
///
/// The stream is split on `^`. Empty tokens (such as the one before a leading
/// `^`) are dropped, and every other token is re-emitted with a single `^` in
/// front of it. Text before the first `^` is therefore re-emitted as if it were
/// a command.
///
/// ```
/// use openlabel_core::scale::scale_commands;
///
/// assert_eq!(scale_commands("^FO10,20,ABC", 200, 300), "^FO15,30,ABC");
/// assert_eq!(scale_commands("^XX1,2,3", 203, 300), "^XX1,2,3");
/// ```
pub fn scale_commands(stream: &str, source: u32, target: u32) -> String {
    let factor = ScaleFactor::new(source, target);
    debug!(
        source,
        target,
        factor = factor.value(),
        identity = factor.is_identity(),
        "scaling command stream"
    );

    let mut out = String::with_capacity(stream.len() + stream.len() / 8);
    for token in stream.split(COMMAND_PREFIX) {
        if token.is_empty() {
            continue;
        }
        out.push(COMMAND_PREFIX);
        out.push_str(&scale_command(token, factor));
    }
    out
}

/// Scale a single command token (without its leading `^`).
///
/// The first two characters are the command code; the remainder is split on
/// `,` into parameters. Returns the token text with the leading parameters
/// covered by the scaling table replaced by their scaled values. Tokens whose
/// code is not in the table come back unchanged.
pub fn scale_command(token: &str, factor: ScaleFactor) -> String {
    let split = token
        .char_indices()
        .nth(2)
        .map_or(token.len(), |(idx, _)| idx);
    let (code, rest) = token.split_at(split);

    let Some(spec) = scale_spec(code) else {
        return token.to_owned();
    };

    let mut params: Vec<String> = rest.split(PARAM_SEPARATOR).map(str::to_owned).collect();
    let count = match spec {
        ScaleSpec::All => params.len(),
        ScaleSpec::Leading(n) => n.min(params.len()),
    };

    for param in params.iter_mut().take(count) {
        if let Some(scaled) = scale_param(param, factor) {
            *param = scaled;
        }
    }

    let mut out = String::with_capacity(token.len() + 4);
    out.push_str(code);
    out.push_str(&params.join(","));
    out
}

/// Scale one parameter, or `None` when it is not numeric.
fn scale_param(param: &str, factor: ScaleFactor) -> Option<String> {
    let value: f64 = param.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    factor.apply(value).map(|v| format!("{v:.0}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_rounds_to_two_places() {
        assert_eq!(ScaleFactor::new(203, 300).value(), 1.48);
        assert_eq!(ScaleFactor::new(300, 203).value(), 0.68);
        assert_eq!(ScaleFactor::new(200, 300).value(), 1.5);
        assert_eq!(ScaleFactor::new(300, 600).value(), 2.0);
        assert!(ScaleFactor::new(203, 203).is_identity());
    }

    #[test]
    fn factor_for_zero_source_is_not_finite() {
        assert!(!ScaleFactor::new(0, 300).value().is_finite());
    }

    #[test]
    fn apply_rounds_half_away_from_zero() {
        let f = ScaleFactor::new(200, 300);
        assert_eq!(f.apply(1.0), Some(2.0)); // 1.5
        assert_eq!(f.apply(-1.0), Some(-2.0)); // -1.5
        assert_eq!(f.apply(3.0), Some(5.0)); // 4.5
    }

    #[test]
    fn apply_normalises_negative_zero() {
        let f = ScaleFactor::new(300, 100);
        let v = f.apply(-0.1).unwrap();
        assert_eq!(format!("{v:.0}"), "0");
    }

    #[test]
    fn table_has_all_codes() {
        assert_eq!(SCALING_TABLE.len(), 23);
        assert_eq!(scale_spec("FO"), Some(ScaleSpec::Leading(2)));
        assert_eq!(scale_spec("BQ"), Some(ScaleSpec::Leading(3)));
        assert_eq!(scale_spec("B7"), Some(ScaleSpec::Leading(2)));
        assert_eq!(scale_spec("A@"), Some(ScaleSpec::All));
        assert_eq!(scale_spec("FD"), None);
        assert_eq!(scale_spec("fo"), None);
    }

    #[test]
    fn leading_count_leaves_trailing_params() {
        let f = ScaleFactor::new(200, 300);
        assert_eq!(scale_command("FO10,20,ABC", f), "FO15,30,ABC");
        assert_eq!(scale_command("BQN,2,10", f), "BQN,3,15");
    }

    #[test]
    fn short_param_list_is_not_padded() {
        let f = ScaleFactor::new(200, 300);
        assert_eq!(scale_command("FO10", f), "FO15");
        assert_eq!(scale_command("FO", f), "FO");
    }

    #[test]
    fn all_params_scaled_for_fonts() {
        let f = ScaleFactor::new(200, 400);
        assert_eq!(scale_command("A0N,30,20", f), "A0N,60,40");
    }

    #[test]
    fn non_numeric_and_empty_params_pass_through() {
        let f = ScaleFactor::new(200, 400);
        assert_eq!(scale_command("GB100,,3,B", f), "GB200,,6,B");
    }

    #[test]
    fn decimal_params_become_integers() {
        let f = ScaleFactor::new(200, 300);
        assert_eq!(scale_command("BY2.5,3.0", f), "BY4,5");
    }

    #[test]
    fn one_char_token_passes_through() {
        let f = ScaleFactor::new(200, 300);
        assert_eq!(scale_command("X", f), "X");
    }

    #[test]
    fn multibyte_code_does_not_panic() {
        let f = ScaleFactor::new(200, 300);
        assert_eq!(scale_command("é10,20", f), "é10,20");
    }

    #[test]
    fn stream_drops_empty_tokens() {
        assert_eq!(scale_commands("^XA^^FO10,10^XZ", 200, 400), "^XA^FO20,20^XZ");
        assert_eq!(scale_commands("", 200, 400), "");
        assert_eq!(scale_commands("^^^", 200, 400), "");
    }

    #[test]
    fn leading_text_gains_prefix() {
        assert_eq!(scale_commands("XA^FO1,1", 100, 200), "^XA^FO2,2");
    }

    #[test]
    fn zero_source_leaves_params_unchanged() {
        assert_eq!(scale_commands("^FO10,20", 0, 300), "^FO10,20");
    }
}
