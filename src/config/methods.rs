//! Derived decisions computed from `InlineOptions`

use std::fs;
use std::path::Path;

use super::types::{InlineOptions, Strategy};
use crate::inline_css::{InlineError, InlineResult};

impl InlineOptions {
    /// Load options from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `InlineError::Io` if the file cannot be read and
    /// `InlineError::InvalidConfig` if it is not a valid options document.
    pub fn from_json_file(path: impl AsRef<Path>) -> InlineResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| InlineError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Parse options from a JSON document
    ///
    /// # Errors
    ///
    /// Returns `InlineError::InvalidConfig` on malformed JSON or unknown values.
    pub fn from_json_str(json: &str) -> InlineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether an href matches any ignore entry
    #[must_use]
    pub fn is_ignored(&self, href: &str) -> bool {
        self.ignore.iter().any(|rule| rule.matches(href))
    }

    /// Whether the preload + `onload` promotion rewrite is in effect
    #[must_use]
    pub fn uses_preload_swap(&self) -> bool {
        self.polyfill || matches!(self.strategy, Some(Strategy::Polyfill | Strategy::Swap))
    }

    /// Whether rewritten links also get a `<noscript>` copy
    #[must_use]
    pub fn uses_noscript_fallback(&self) -> bool {
        self.uses_preload_swap() || self.strategy == Some(Strategy::Media)
    }

    /// Whether the loadCSS polyfill has to be present in the document
    #[must_use]
    pub fn needs_loader(&self) -> bool {
        self.polyfill || self.strategy == Some(Strategy::Polyfill)
    }
}
