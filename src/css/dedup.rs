//! Rule-level subtraction between stylesheets
//!
//! Both sides are normalized to minified text before comparison, so two rules
//! are "the same" when they print identically. Rules nested in `@media` blocks
//! are compared together with their media query, and a block left without
//! rules is dropped.

use std::collections::HashSet;

use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;

fn normalize_newlines(css: &str) -> String {
    css.replace("\r\n", "\n").replace('\r', "\n")
}

fn tolerant_parser<'a>() -> ParserOptions<'a> {
    ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    }
}

fn printer<'a>(minify: bool) -> PrinterOptions<'a> {
    PrinterOptions {
        minify,
        ..PrinterOptions::default()
    }
}

/// Minify a stylesheet
///
/// Input that cannot be parsed at all is returned trimmed instead of failing.
#[must_use]
pub fn minify(css: &str) -> String {
    render(&normalize_newlines(css), true)
}

fn render(css: &str, minify: bool) -> String {
    let sheet = match StyleSheet::parse(css, tolerant_parser()) {
        Ok(sheet) => sheet,
        Err(e) => {
            log::debug!("Passing through unparsable CSS: {e}");
            return css.trim().to_string();
        }
    };

    match sheet.to_css(printer(minify)) {
        Ok(result) => result.code.trim().to_string(),
        Err(e) => {
            log::debug!("Passing through unprintable CSS: {e}");
            css.trim().to_string()
        }
    }
}

/// Rules of `target` not already present in `already_present`, minified
///
/// An empty or whitespace-only result means nothing is missing.
#[must_use]
pub fn compute_missing<S: AsRef<str>>(target: &str, already_present: &[S]) -> String {
    subtract(target, already_present, true)
}

/// Same as [`compute_missing`] but prints the remaining rules expanded
#[must_use]
pub fn compute_missing_pretty<S: AsRef<str>>(target: &str, already_present: &[S]) -> String {
    subtract(target, already_present, false)
}

fn subtract<S: AsRef<str>>(target: &str, already_present: &[S], minify_output: bool) -> String {
    let target = minify(target);
    let present = minify(
        &already_present
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n"),
    );

    if present.trim().is_empty() {
        return if minify_output {
            target
        } else {
            render(&target, false)
        };
    }

    let Ok(present_sheet) = StyleSheet::parse(&present, tolerant_parser()) else {
        return target;
    };
    let mut known = HashSet::new();
    collect_rule_keys(&present_sheet.rules, "", &mut known);

    let source = target.clone();
    let mut sheet = match StyleSheet::parse(&source, tolerant_parser()) {
        Ok(sheet) => sheet,
        Err(e) => {
            log::debug!("Cannot subtract from unparsable CSS: {e}");
            return target;
        }
    };
    discard_known_rules(&mut sheet.rules, "", &known);

    match sheet.to_css(printer(minify_output)) {
        Ok(result) => result.code.trim().to_string(),
        Err(e) => {
            log::debug!("Failed to print deduplicated CSS: {e}");
            target
        }
    }
}

fn rule_key(rule: &CssRule, scope: &str) -> Option<String> {
    rule.to_css_string(printer(true))
        .ok()
        .map(|text| format!("{scope}{text}"))
}

fn media_scope(scope: &str, rule: &CssRule) -> Option<String> {
    match rule {
        CssRule::Media(media) => media
            .query
            .to_css_string(printer(true))
            .ok()
            .map(|query| format!("{scope}@media {query}|")),
        _ => None,
    }
}

fn collect_rule_keys(rules: &CssRuleList, scope: &str, keys: &mut HashSet<String>) {
    for rule in &rules.0 {
        if let Some(key) = rule_key(rule, scope) {
            keys.insert(key);
        }
        if let (Some(nested_scope), CssRule::Media(media)) = (media_scope(scope, rule), rule) {
            collect_rule_keys(&media.rules, &nested_scope, keys);
        }
    }
}

fn discard_known_rules(rules: &mut CssRuleList, scope: &str, keys: &HashSet<String>) {
    rules.0.retain_mut(|rule| {
        if rule_key(rule, scope).is_some_and(|key| keys.contains(&key)) {
            return false;
        }
        let Some(nested_scope) = media_scope(scope, rule) else {
            return true;
        };
        match rule {
            CssRule::Media(media) => {
                discard_known_rules(&mut media.rules, &nested_scope, keys);
                !media.rules.0.is_empty()
            }
            _ => true,
        }
    });
}

/// Heuristic used to tell CSS input apart from HTML input
///
/// Markup never starts with a selector, and strict parsing rejects the
/// stray `<` tokens HTML is made of.
#[must_use]
pub fn looks_like_css(text: &str) -> bool {
    let trimmed = text.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return false;
    }
    StyleSheet::parse(trimmed, ParserOptions::default()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_minify_collapses_whitespace() {
        let css = "body {\n  color: red;\n}\n\n.a  { margin : 0 }";
        assert_eq!(minify(css), "body{color:red}.a{margin:0}");
    }

    #[test]
    fn test_compute_missing_removes_present_rules() {
        let target = "body{color:red}.a{margin:0}.b{padding:0}";
        let present = ["body { color: red }", ".b{padding:0}"];
        assert_eq!(compute_missing(target, &present), ".a{margin:0}");
    }

    #[test]
    fn test_compute_missing_nothing_present_returns_minified_target() {
        let empty: [&str; 0] = [];
        assert_eq!(compute_missing("body {  color: red; }", &empty), "body{color:red}");
        assert_eq!(compute_missing("body {  color: red; }", &["  \n"]), "body{color:red}");
    }

    #[test]
    fn test_compute_missing_line_endings_do_not_matter() {
        let target = "body {\r\n  color: red;\r\n}\r\n";
        assert_eq!(compute_missing(target, &["body {\n  color: red;\n}\n"]), "");
    }

    #[test]
    fn test_compute_missing_inside_media() {
        let target = "@media (min-width:600px){.a{margin:0}.b{padding:0}}";
        let present = ["@media (min-width: 600px) { .a { margin: 0 } }"];
        let missing = compute_missing(target, &present);
        assert!(missing.contains(".b{padding:0}"));
        assert!(!missing.contains(".a{margin:0}"));

        let all = ["@media (min-width: 600px) { .a { margin: 0 } .b { padding: 0 } }"];
        assert_eq!(compute_missing(target, &all), "");
    }

    #[test]
    fn test_same_rule_in_other_media_is_kept() {
        let target = "@media print{.a{margin:0}}";
        let present = [".a{margin:0}"];
        assert!(compute_missing(target, &present).contains(".a{margin:0}"));
    }

    #[test]
    fn test_empty_target_yields_empty() {
        assert_eq!(compute_missing("", &["body{color:red}"]), "");
        assert_eq!(compute_missing("   \n", &["body{color:red}"]), "");
    }

    #[test]
    fn test_compute_missing_with_unrelated_present_keeps_target() {
        let target = ".a { margin: 0 }\n.b { padding: 0 }";
        assert_eq!(
            compute_missing(target, &[".c{top:0}"]),
            ".a{margin:0}.b{padding:0}"
        );
        assert_eq!(compute_missing(target, &["@@@"]), ".a{margin:0}.b{padding:0}");
    }

    #[test]
    fn test_pretty_output_is_expanded() {
        let missing = compute_missing_pretty(".a{margin:0}.b{padding:0}", &[".a{margin:0}"]);
        assert!(missing.contains(".b {"));
        assert!(!missing.contains(".a"));
    }

    #[test]
    fn test_looks_like_css() {
        assert!(looks_like_css("body { color: red }"));
        assert!(!looks_like_css("<!DOCTYPE html><html></html>"));
        assert!(!looks_like_css("   "));
    }

    proptest! {
        #[test]
        fn prop_subtracting_itself_leaves_nothing(
            rules in proptest::collection::vec(("[a-z]{1,6}", 0u32..500), 1..8)
        ) {
            let css: String = rules
                .iter()
                .map(|(class, px)| format!(".{class} {{ margin: {px}px }}\n"))
                .collect();
            prop_assert_eq!(compute_missing(&css, &[css.as_str()]), "");
        }

        #[test]
        fn prop_compute_missing_is_deterministic(
            rules in proptest::collection::vec(("[a-z]{1,6}", 0u32..500), 1..8)
        ) {
            let css: String = rules
                .iter()
                .map(|(class, px)| format!(".{class}{{padding:{px}px}}"))
                .collect();
            let present = [".a{padding:1px}"];
            prop_assert_eq!(compute_missing(&css, &present), compute_missing(&css, &present));
        }
    }
}
