//! Getter methods for `InlineOptions`

use std::path::Path;

use super::types::{IgnoreRule, InlineOptions, NoscriptPlacement, Strategy};

impl InlineOptions {
    #[must_use]
    pub fn ignore(&self) -> &[IgnoreRule] {
        &self.ignore
    }

    #[must_use]
    pub fn extract(&self) -> bool {
        self.extract
    }

    #[must_use]
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    #[must_use]
    pub fn noscript(&self) -> NoscriptPlacement {
        self.noscript
    }

    #[must_use]
    pub fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    #[must_use]
    pub fn polyfill(&self) -> bool {
        self.polyfill
    }

    #[must_use]
    pub fn replace_stylesheets(&self) -> Option<&[String]> {
        self.replace_stylesheets.as_deref()
    }

    #[must_use]
    pub fn minify(&self) -> bool {
        self.minify
    }
}
