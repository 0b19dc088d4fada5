//! Fluent builder for `InlineOptions`
//!
//! Every option has a default, so the builder has no required steps. Ignore
//! entries may be added one at a time or in bulk; scalars and lists end up in
//! the same normalized list.

use std::path::PathBuf;

use super::types::{IgnoreRule, InlineOptions, NoscriptPlacement, Strategy};

#[derive(Debug, Clone, Default)]
pub struct InlineOptionsBuilder {
    options: InlineOptions,
}

impl InlineOptions {
    /// Create a builder for configuring `InlineOptions` with a fluent interface
    #[must_use]
    pub fn builder() -> InlineOptionsBuilder {
        InlineOptionsBuilder::default()
    }
}

/// Continue configuring options loaded elsewhere, e.g. from a JSON file
impl From<InlineOptions> for InlineOptionsBuilder {
    fn from(options: InlineOptions) -> Self {
        Self { options }
    }
}

impl InlineOptionsBuilder {
    /// Add a single ignore entry
    #[must_use]
    pub fn ignore(mut self, rule: impl Into<IgnoreRule>) -> Self {
        self.options.ignore.push(rule.into());
        self
    }

    /// Add several ignore entries at once
    #[must_use]
    pub fn ignore_all<I, R>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<IgnoreRule>,
    {
        self.options.ignore.extend(rules.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn extract(mut self, extract: bool) -> Self {
        self.options.extract = extract;
        self
    }

    #[must_use]
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.base_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.options.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn noscript(mut self, placement: NoscriptPlacement) -> Self {
        self.options.noscript = placement;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.options.strategy = Some(strategy);
        self
    }

    /// Legacy polyfill switch
    #[must_use]
    pub fn polyfill(mut self, polyfill: bool) -> Self {
        self.options.polyfill = polyfill;
        self
    }

    /// Replace eligible stylesheets with these hrefs; an empty list removes them
    #[must_use]
    pub fn replace_stylesheets<I, S>(mut self, hrefs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.replace_stylesheets = Some(hrefs.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn minify(mut self, minify: bool) -> Self {
        self.options.minify = minify;
        self
    }

    #[must_use]
    pub fn build(self) -> InlineOptions {
        self.options
    }
}
