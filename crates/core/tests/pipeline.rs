//! End-to-end tests: template rendering followed by resolution scaling.

use openlabel_core::{
    Placeholders, Resolution, TemplateError, TemplateErrorKind, prepare, render,
};

fn ctx(pairs: &[(&str, &str)]) -> Placeholders {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ── Rendering ───────────────────────────────────────────────────────────

#[test]
fn conditional_present_key() {
    assert_eq!(render("{{IF X}}A{{ENDIF}}B", &ctx(&[("X", "v")])).unwrap(), "AB");
}

#[test]
fn conditional_absent_key() {
    assert_eq!(render("{{IF X}}A{{ENDIF}}B", &ctx(&[])).unwrap(), "B");
}

#[test]
fn condition_with_empty_value_still_counts_as_present() {
    assert_eq!(render("{{IF X}}A{{ENDIF}}", &ctx(&[("X", "")])).unwrap(), "A");
}

#[test]
fn unterminated_block_is_missing_endif() {
    let err = render("{{IF X}}A", &ctx(&[("X", "v")])).unwrap_err();
    assert_eq!(err.kind(), TemplateErrorKind::MissingEndif);
}

#[test]
fn placeholders_apply_after_conditionals() {
    // The condition name is also a placeholder key; substitution must not
    // rewrite the marker before the block is resolved.
    let out = render("{{IF NAME}}Hi NAME{{ENDIF}}", &ctx(&[("NAME", "Ada")])).unwrap();
    assert_eq!(out, "Hi Ada");
}

#[test]
fn inserted_values_are_not_rescanned_by_their_own_key() {
    let out = render("<ID>", &ctx(&[("<ID>", "<ID>-<ID>")])).unwrap();
    assert_eq!(out, "<ID>-<ID>");
}

#[test]
fn inserted_values_are_not_rescanned_by_other_keys() {
    let out = render("{A}", &ctx(&[("{A}", "{B}"), ("{B}", "x")])).unwrap();
    assert_eq!(out, "{B}");
    // Holds in the other key order as well.
    let out = render("^FD{B}^FS", &ctx(&[("{A}", "x"), ("{B}", "{A}")])).unwrap();
    assert_eq!(out, "^FD{A}^FS");
}

#[test]
fn multi_block_header_closing_after_endif_is_malformed() {
    let err = render("{{IF A{{ENDIF}}x}}...{{ENDIF}}", &ctx(&[("A", "v")])).unwrap_err();
    assert_eq!(err, TemplateError::MalformedCondition { offset: Some(0) });
}

#[test]
fn error_is_a_value_not_a_panic() {
    let res = render("^XA{{IF A}}^FDx^FS", &ctx(&[]));
    assert!(matches!(
        res,
        Err(TemplateError::MissingEndif { offset: Some(3) })
    ));
}

// ── Render + scale ──────────────────────────────────────────────────────

#[test]
fn prepare_renders_then_scales() {
    let tpl = "^XA{{IF BOXED}}^FO10,10^GB100,50,2^FS{{ENDIF}}^FO20,20^A0N,30,30^FD{NAME}^FS^XZ";
    let out = prepare(
        tpl,
        &ctx(&[("BOXED", ""), ("{NAME}", "Widget")]),
        Resolution::new(200, 400),
    )
    .unwrap();
    assert_eq!(
        out,
        "^XA^FO20,20^GB200,100,4^FS^FO40,40^A0N,60,60^FDWidget^FS^XZ"
    );
}

#[test]
fn placeholder_values_can_carry_geometry() {
    // Values are substituted before scaling, so numbers they introduce are
    // scaled too.
    let vars = ctx(&[("{X}", "100"), ("{Y}", "40")]);
    let out = prepare("^FO{X},{Y}^FS", &vars, Resolution::new(203, 300)).unwrap();
    assert_eq!(out, "^FO148,59^FS");
}

#[test]
fn prepare_propagates_template_errors() {
    let err = prepare("{{IF X A{{ENDIF}}", &ctx(&[]), Resolution::new(203, 300)).unwrap_err();
    assert_eq!(err.kind(), TemplateErrorKind::MalformedCondition);
}

#[test]
fn error_kind_serializes_snake_case() {
    let json = serde_json::to_string(&TemplateErrorKind::MalformedCondition).unwrap();
    assert_eq!(json, "\"malformed_condition\"");
}
