//! Tests for option loading and normalization

mod common;

use common::write_fixture;
use critical_inline::config::{IgnoreRule, InlineOptions, NoscriptPlacement, Strategy};
use critical_inline::inline_css::InlineError;
use tempfile::TempDir;

#[test]
fn test_json_options_use_camel_case_names() {
    let options = InlineOptions::from_json_str(
        r#"{
            "ignore": ["a.css", "/^vendor/"],
            "extract": true,
            "basePath": "dist",
            "selector": "title",
            "noscript": "head",
            "strategy": "polyfill",
            "replaceStylesheets": ["all.css"],
            "minify": false
        }"#,
    )
    .expect("valid options");

    assert_eq!(options.ignore().len(), 2);
    assert!(matches!(options.ignore()[0], IgnoreRule::Literal(_)));
    assert!(matches!(options.ignore()[1], IgnoreRule::Pattern(_)));
    assert!(options.is_ignored("vendor/lib.css"));
    assert!(options.extract());
    assert_eq!(options.base_path(), Some(std::path::Path::new("dist")));
    assert_eq!(options.selector(), Some("title"));
    assert_eq!(options.noscript(), NoscriptPlacement::Head);
    assert_eq!(options.strategy(), Some(Strategy::Polyfill));
    assert_eq!(options.replace_stylesheets(), Some(&["all.css".to_string()][..]));
    assert!(!options.minify());
    assert!(options.needs_loader());
}

#[test]
fn test_json_defaults() {
    let options = InlineOptions::from_json_str("{}").expect("empty options");
    assert_eq!(options, InlineOptions::default());
    assert_eq!(options.noscript(), NoscriptPlacement::Body);
    assert!(options.minify());
    assert!(!options.uses_noscript_fallback());
}

#[test]
fn test_noscript_false_disables_fallbacks() {
    let options = InlineOptions::from_json_str(r#"{ "noscript": false }"#).expect("valid");
    assert_eq!(options.noscript(), NoscriptPlacement::Disabled);
}

#[test]
fn test_invalid_ignore_pattern_is_rejected() {
    let err = InlineOptions::from_json_str(r#"{ "ignore": ["/([a-z/"] }"#)
        .expect_err("unbalanced pattern");
    assert!(matches!(err, InlineError::InvalidConfig(_)));
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let err = InlineOptions::from_json_str(r#"{ "strategy": "eager" }"#).expect_err("bad strategy");
    assert!(err.to_string().starts_with("Invalid options"));
}

#[test]
fn test_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_fixture(dir.path(), "options.json", r#"{ "strategy": "media" }"#);
    let options = InlineOptions::from_json_file(&path).expect("load options");
    assert_eq!(options.strategy(), Some(Strategy::Media));

    let err = InlineOptions::from_json_file(dir.path().join("absent.json")).expect_err("missing file");
    assert!(matches!(err, InlineError::Io { .. }));
}

#[test]
fn test_scalar_ignore_is_a_single_rule() {
    let options = InlineOptions::from_json_str(r#"{ "ignore": "a.css" }"#).expect("scalar ignore");
    assert_eq!(options.ignore(), &[IgnoreRule::Literal("a.css".to_string())]);

    let options = InlineOptions::from_json_str(r#"{ "ignore": "/^vendor/" }"#).expect("scalar pattern");
    assert_eq!(options.ignore().len(), 1);
    assert!(options.is_ignored("vendor/lib.css"));
    assert!(!options.is_ignored("a.css"));
}

#[test]
fn test_scalar_invalid_ignore_pattern_is_rejected() {
    let err = InlineOptions::from_json_str(r#"{ "ignore": "/([a-z/" }"#).expect_err("unbalanced pattern");
    assert!(matches!(err, InlineError::InvalidConfig(_)));
}
