//! Error and result types for critical CSS inlining

use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

/// Result type alias for inlining operations
pub type InlineResult<T> = Result<T, InlineError>;

/// Errors surfaced by the inlining pipeline
///
/// The DOM adapter and the CSS helpers never produce these; everything here
/// originates in the pipeline boundary, option parsing or extraction.
#[derive(Debug, Error)]
pub enum InlineError {
    /// Extraction was requested but a relative href has no base path to resolve against
    #[error("file \"{href}\" cannot be resolved without a base path. Specify base path.")]
    Configuration { href: String },

    /// A relative href selected for extraction does not exist below the base path
    #[error("file \"{href}\" not found in \"{}\". Specify base path.", base.display())]
    MissingResource { href: String, base: PathBuf },

    /// HTML or CSS input is not valid UTF-8
    #[error("{input} input is not valid UTF-8: {source}")]
    InputDecode {
        input: &'static str,
        #[source]
        source: Utf8Error,
    },

    /// Reading or writing a stylesheet failed
    #[error("IO error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An ignore entry written as `/expr/flags` did not compile
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An options file could not be parsed
    #[error("Invalid options: {0}")]
    InvalidConfig(String),
}

impl InlineError {
    /// Whether the CLI should print usage text next to this error
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            InlineError::Configuration { .. }
                | InlineError::MissingResource { .. }
                | InlineError::InputDecode { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InlineError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for InlineError {
    fn from(error: serde_json::Error) -> Self {
        InlineError::InvalidConfig(error.to_string())
    }
}
