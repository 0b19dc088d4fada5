//! Critical CSS inlining pipeline
//!
//! Entry points are [`inline`] for byte input and [`inline_str`] for text.
//! The pipeline places the critical rules in `<head>`, turns blocking
//! stylesheet links into asynchronously loaded ones and optionally extracts
//! the inlined rules from the stylesheets on disk.

// Sub-modules
pub mod extract;
pub mod orchestrator;
pub mod strategy;
pub mod types;

// Re-exports for public API
pub use extract::{content_hash, extract_stylesheet, resolve_source, revision, revision_href};
pub use orchestrator::{inline, inline_str};
pub use strategy::AsyncRewrite;
pub use types::{InlineError, InlineResult};
