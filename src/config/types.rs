//! Core option types for critical CSS inlining
//!
//! This module contains `InlineOptions` and the small value types it is made
//! of. Field names serialize in camelCase so an options file reads the same as
//! the command line flags.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::inline_css::InlineError;

lazy_static! {
    static ref PATTERN_LITERAL: Regex = Regex::new(r"^/(?P<expression>.*)/(?P<flags>[gimsxy]*)$")
        .expect("BUG: hardcoded ignore pattern regex is invalid - this is a compile-time bug");
}

/// Async loading technique applied to each rewritten stylesheet link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Preload in head, authoritative `<link rel="stylesheet">` before `</body>`
    Body,
    /// `media="print"` with an `onload` switching back to the real media
    Media,
    /// Preload with `onload` promotion, no loader script
    Swap,
    /// Preload with `onload` promotion plus the loadCSS polyfill
    Polyfill,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(Strategy::Body),
            "media" => Ok(Strategy::Media),
            "swap" => Ok(Strategy::Swap),
            "polyfill" => Ok(Strategy::Polyfill),
            other => Err(format!(
                "unknown strategy '{other}' (expected body, media, swap or polyfill)"
            )),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Body => write!(f, "body"),
            Strategy::Media => write!(f, "media"),
            Strategy::Swap => write!(f, "swap"),
            Strategy::Polyfill => write!(f, "polyfill"),
        }
    }
}

/// Where queued `<noscript>` fallbacks are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "NoscriptValue", into = "NoscriptValue")]
pub enum NoscriptPlacement {
    Head,
    #[default]
    Body,
    /// Fallbacks are dropped entirely
    Disabled,
}

/// Wire form of `NoscriptPlacement`: `"head"`, `"body"` or `false`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NoscriptValue {
    Flag(bool),
    Position(String),
}

impl TryFrom<NoscriptValue> for NoscriptPlacement {
    type Error = String;

    fn try_from(value: NoscriptValue) -> Result<Self, Self::Error> {
        match value {
            NoscriptValue::Flag(false) => Ok(NoscriptPlacement::Disabled),
            NoscriptValue::Flag(true) => Ok(NoscriptPlacement::Body),
            NoscriptValue::Position(position) => position.parse(),
        }
    }
}

impl From<NoscriptPlacement> for NoscriptValue {
    fn from(placement: NoscriptPlacement) -> Self {
        match placement {
            NoscriptPlacement::Head => NoscriptValue::Position("head".to_string()),
            NoscriptPlacement::Body => NoscriptValue::Position("body".to_string()),
            NoscriptPlacement::Disabled => NoscriptValue::Flag(false),
        }
    }
}

impl FromStr for NoscriptPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "head" => Ok(NoscriptPlacement::Head),
            "body" | "true" => Ok(NoscriptPlacement::Body),
            "false" | "none" => Ok(NoscriptPlacement::Disabled),
            other => Err(format!(
                "unknown noscript placement '{other}' (expected head, body or false)"
            )),
        }
    }
}

/// One entry of the `ignore` option
///
/// Literal entries must equal the href exactly, pattern entries are searched
/// anywhere in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IgnoreRule {
    Literal(String),
    Pattern(Regex),
}

impl IgnoreRule {
    /// Parse a user supplied entry, `/expr/flags` becomes a pattern
    ///
    /// # Errors
    ///
    /// Returns `InlineError::InvalidIgnorePattern` if the expression does not compile.
    pub fn parse(value: &str) -> Result<Self, InlineError> {
        let Some(caps) = PATTERN_LITERAL.captures(value) else {
            return Ok(IgnoreRule::Literal(value.to_string()));
        };

        let expression = &caps["expression"];
        let flags = &caps["flags"];

        // `g` and `y` only affect stateful matching, which never applies here
        RegexBuilder::new(expression)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'))
            .build()
            .map(IgnoreRule::Pattern)
            .map_err(|source| InlineError::InvalidIgnorePattern {
                pattern: value.to_string(),
                source,
            })
    }

    /// Whether this rule matches the given href
    #[must_use]
    pub fn matches(&self, href: &str) -> bool {
        match self {
            IgnoreRule::Literal(literal) => literal == href,
            IgnoreRule::Pattern(pattern) => pattern.is_match(href),
        }
    }
}

impl From<&str> for IgnoreRule {
    fn from(value: &str) -> Self {
        IgnoreRule::Literal(value.to_string())
    }
}

impl From<Regex> for IgnoreRule {
    fn from(value: Regex) -> Self {
        IgnoreRule::Pattern(value)
    }
}

impl TryFrom<String> for IgnoreRule {
    type Error = InlineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        IgnoreRule::parse(&value)
    }
}

impl From<IgnoreRule> for String {
    fn from(rule: IgnoreRule) -> Self {
        match rule {
            IgnoreRule::Literal(literal) => literal,
            IgnoreRule::Pattern(pattern) => format!("/{}/", pattern.as_str()),
        }
    }
}

impl PartialEq for IgnoreRule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IgnoreRule::Literal(a), IgnoreRule::Literal(b)) => a == b,
            (IgnoreRule::Pattern(a), IgnoreRule::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(IgnoreRule),
    Many(Vec<IgnoreRule>),
}

/// Accept `"ignore": "a.css"` as well as `"ignore": ["a.css", "/vendor/"]`
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<IgnoreRule>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(rule) => vec![rule],
        OneOrMany::Many(rules) => rules,
    })
}

/// Options controlling a single inlining run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineOptions {
    /// Stylesheets excluded from async rewriting
    #[serde(deserialize_with = "one_or_many")]
    pub(crate) ignore: Vec<IgnoreRule>,

    /// Rewrite referenced stylesheet files without the inlined rules
    pub(crate) extract: bool,

    /// Root for resolving relative hrefs during extraction
    pub(crate) base_path: Option<PathBuf>,

    /// Element the critical `<style>` block is inserted before
    pub(crate) selector: Option<String>,

    pub(crate) noscript: NoscriptPlacement,

    pub(crate) strategy: Option<Strategy>,

    /// Legacy switch equivalent to `strategy: polyfill`
    pub(crate) polyfill: bool,

    /// Replacement hrefs; when set, eligible links are replaced instead of rewritten
    pub(crate) replace_stylesheets: Option<Vec<String>>,

    /// Emit minified CSS for the inlined block and extracted files
    pub(crate) minify: bool,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            extract: false,
            base_path: None,
            selector: None,
            noscript: NoscriptPlacement::Body,
            strategy: None,
            polyfill: false,
            replace_stylesheets: None,
            minify: true,
        }
    }
}
